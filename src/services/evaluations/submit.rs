use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{
    EvaluationService, scoring::EvaluationPatch, validation_failed,
    workflow::{self, EvaluationError},
};
use crate::errors::HackflowError;
use crate::models::evaluations::requests::SubmitEvaluationRequest;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{error_response, invalidate_leaderboard};

pub async fn submit_evaluation(
    service: &EvaluationService,
    request: &HttpRequest,
    judge_id: i64,
    req: SubmitEvaluationRequest,
) -> ActixResult<HttpResponse> {
    let patch = match EvaluationPatch::parse(&req.scores, req.feedback, req.recommendation) {
        Ok(patch) => patch,
        Err(errors) => return Ok(validation_failed(errors)),
    };

    let storage = service.get_storage(request);
    let result = workflow::submit_evaluation(
        &storage,
        service.get_scoring(),
        judge_id,
        req.project_id,
        patch,
    )
    .await;

    match result {
        Ok(outcome) => {
            invalidate_leaderboard(request).await;
            Ok(HttpResponse::Created().json(ApiResponse::success(
                outcome,
                "Evaluation submitted successfully",
            )))
        }
        Err(EvaluationError::Invalid(errors)) => Ok(validation_failed(errors)),
        Err(EvaluationError::Failed(e)) => {
            let code = match &e {
                HackflowError::DuplicateEvaluation(_) => ErrorCode::EvaluationAlreadyExists,
                HackflowError::NotFound(_) => ErrorCode::ProjectNotFound,
                HackflowError::InvalidState(_) => ErrorCode::ProjectNotEvaluable,
                HackflowError::Validation(_) => ErrorCode::EvaluationInvalid,
                _ => ErrorCode::EvaluationFailed,
            };
            Ok(error_response(&e, code))
        }
    }
}
