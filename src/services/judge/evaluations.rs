use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::JudgeService;
use crate::models::{ApiResponse, ErrorCode};

pub async fn list_my_evaluations(
    service: &JudgeService,
    request: &HttpRequest,
    judge_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage.list_evaluations_by_judge(judge_id).await {
        Ok(items) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            items,
            "Evaluations retrieved successfully",
        ))),
        Err(e) => Ok(
            HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::InternalServerError,
                format!("Failed to list evaluations: {e}"),
            )),
        ),
    }
}
