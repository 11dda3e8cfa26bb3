use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{ProjectService, validate};
use crate::models::projects::entities::SubmissionStatus;
use crate::models::projects::requests::UpdateProjectRequest;
use crate::models::{ApiResponse, ErrorCode};

pub async fn update_project(
    service: &ProjectService,
    request: &HttpRequest,
    user_id: i64,
    project_id: i64,
    req: UpdateProjectRequest,
) -> ActixResult<HttpResponse> {
    let project = match service.load_owned_project(request, project_id, user_id).await {
        Ok(project) => project,
        Err(response) => return Ok(response),
    };

    if project.submission_status != SubmissionStatus::Draft {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::ProjectNotEditable,
            "Only draft projects can be edited",
        )));
    }

    if let Err(msg) = validate::validate_update(&req) {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::ValidationFailed,
            msg,
        )));
    }

    let storage = service.get_storage(request);

    match storage.update_project(project_id, req).await {
        Ok(Some(updated)) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            updated,
            "Project updated successfully",
        ))),
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::ProjectNotFound,
            "Project not found",
        ))),
        Err(e) => Ok(
            HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::ProjectUpdateFailed,
                format!("Failed to update project: {e}"),
            )),
        ),
    }
}
