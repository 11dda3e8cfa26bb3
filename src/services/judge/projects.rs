use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::JudgeService;
use crate::models::judge::requests::JudgeProjectQuery;
use crate::models::{ApiResponse, ErrorCode};

pub async fn list_projects(
    service: &JudgeService,
    request: &HttpRequest,
    judge_id: i64,
    query: JudgeProjectQuery,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage.list_judgeable_projects(judge_id, query).await {
        Ok(items) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            items,
            "Projects retrieved successfully",
        ))),
        Err(e) => Ok(
            HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::InternalServerError,
                format!("Failed to list projects: {e}"),
            )),
        ),
    }
}
