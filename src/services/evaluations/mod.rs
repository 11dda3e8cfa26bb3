pub mod scoring;
pub mod submit;
pub mod update;
pub mod workflow;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::config::{AppConfig, ScoringConfig};
use crate::models::evaluations::requests::{SubmitEvaluationRequest, UpdateEvaluationRequest};
use crate::models::evaluations::responses::FieldError;
use crate::models::{ApiResponse, ErrorCode};
use crate::storage::Storage;

/// 评审字段校验失败，返回结构化的字段错误列表
pub(crate) fn validation_failed(errors: Vec<FieldError>) -> HttpResponse {
    HttpResponse::BadRequest().json(ApiResponse::error(
        ErrorCode::ValidationFailed,
        errors,
        "Evaluation validation failed",
    ))
}


pub struct EvaluationService {
    storage: Option<Arc<dyn Storage>>,
}

impl EvaluationService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> Arc<dyn Storage> {
        if let Some(storage) = &self.storage {
            storage.clone()
        } else {
            request
                .app_data::<actix_web::web::Data<Arc<dyn Storage>>>()
                .expect("Storage not found in app data")
                .get_ref()
                .clone()
        }
    }

    pub(crate) fn get_scoring(&self) -> &ScoringConfig {
        &AppConfig::get().scoring
    }

    // 提交评审
    pub async fn submit_evaluation(
        &self,
        request: &HttpRequest,
        judge_id: i64,
        req: SubmitEvaluationRequest,
    ) -> ActixResult<HttpResponse> {
        submit::submit_evaluation(self, request, judge_id, req).await
    }

    // 修改评审
    pub async fn update_evaluation(
        &self,
        request: &HttpRequest,
        judge_id: i64,
        evaluation_id: i64,
        req: UpdateEvaluationRequest,
    ) -> ActixResult<HttpResponse> {
        update::update_evaluation(self, request, judge_id, evaluation_id, req).await
    }
}
