use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{
    EvaluationService, scoring::EvaluationPatch, validation_failed,
    workflow::{self, EvaluationError},
};
use crate::errors::HackflowError;
use crate::models::evaluations::requests::UpdateEvaluationRequest;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{error_response, invalidate_leaderboard};

pub async fn update_evaluation(
    service: &EvaluationService,
    request: &HttpRequest,
    judge_id: i64,
    evaluation_id: i64,
    req: UpdateEvaluationRequest,
) -> ActixResult<HttpResponse> {
    let patch = match EvaluationPatch::parse(&req.scores, req.feedback, req.recommendation) {
        Ok(patch) => patch,
        Err(errors) => return Ok(validation_failed(errors)),
    };

    let storage = service.get_storage(request);
    let result = workflow::update_evaluation(
        &storage,
        service.get_scoring(),
        judge_id,
        evaluation_id,
        patch,
    )
    .await;

    match result {
        Ok(outcome) => {
            invalidate_leaderboard(request).await;
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                outcome,
                "Evaluation updated successfully",
            )))
        }
        Err(EvaluationError::Invalid(errors)) => Ok(validation_failed(errors)),
        Err(EvaluationError::Failed(e)) => {
            let code = match &e {
                HackflowError::NotFound(_) => ErrorCode::EvaluationNotFound,
                HackflowError::Conflict(_) => ErrorCode::EvaluationConflict,
                HackflowError::InvalidState(_) => ErrorCode::ProjectNotEvaluable,
                HackflowError::Validation(_) => ErrorCode::EvaluationInvalid,
                _ => ErrorCode::EvaluationFailed,
            };
            Ok(error_response(&e, code))
        }
    }
}
