pub mod evaluations;
pub mod projects;
pub mod stats;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::judge::requests::JudgeProjectQuery;
use crate::storage::Storage;

pub struct JudgeService {
    storage: Option<Arc<dyn Storage>>,
}

impl JudgeService {
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

    // 待评审项目列表
    pub async fn list_projects(
        &self,
        request: &HttpRequest,
        judge_id: i64,
        query: JudgeProjectQuery,
    ) -> ActixResult<HttpResponse> {
        projects::list_projects(self, request, judge_id, query).await
    }

    // 我的评审
    pub async fn list_my_evaluations(
        &self,
        request: &HttpRequest,
        judge_id: i64,
    ) -> ActixResult<HttpResponse> {
        evaluations::list_my_evaluations(self, request, judge_id).await
    }

    // 评审进度统计
    pub async fn get_stats(&self, request: &HttpRequest, judge_id: i64) -> ActixResult<HttpResponse> {
        stats::get_stats(self, request, judge_id).await
    }
}
