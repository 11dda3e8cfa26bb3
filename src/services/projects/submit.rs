use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::ProjectService;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::error_response;

pub async fn submit_project(
    service: &ProjectService,
    request: &HttpRequest,
    user_id: i64,
    project_id: i64,
) -> ActixResult<HttpResponse> {
    if let Err(response) = service.load_owned_project(request, project_id, user_id).await {
        return Ok(response);
    }
    if let Err(response) = service.check_submission_window(request).await {
        return Ok(response);
    }

    let storage = service.get_storage(request);

    match storage.submit_project(project_id).await {
        Ok(Some(project)) => {
            info!("Project {} submitted by user {}", project_id, user_id);
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                project,
                "Project submitted successfully",
            )))
        }
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::ProjectNotFound,
            "Project not found",
        ))),
        // 非草稿状态
        Err(e) => Ok(error_response(&e, ErrorCode::ProjectAlreadySubmitted)),
    }
}
