pub mod account;
pub mod profile;
pub mod stats;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::users::requests::UserSearchQuery;
use crate::storage::Storage;

pub struct UserService {
    storage: Option<Arc<dyn Storage>>,
}

impl UserService {
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

    // 公开资料
    pub async fn get_profile(
        &self,
        request: &HttpRequest,
        user_id: i64,
    ) -> ActixResult<HttpResponse> {
        profile::get_profile(self, request, user_id).await
    }

    // 搜索用户
    pub async fn search_users(
        &self,
        request: &HttpRequest,
        query: UserSearchQuery,
    ) -> ActixResult<HttpResponse> {
        profile::search_users(self, request, query).await
    }

    // 当前用户概况
    pub async fn get_stats(&self, request: &HttpRequest, user_id: i64) -> ActixResult<HttpResponse> {
        stats::get_stats(self, request, user_id).await
    }

    // 注销账号
    pub async fn delete_account(
        &self,
        request: &HttpRequest,
        user_id: i64,
    ) -> ActixResult<HttpResponse> {
        account::delete_account(self, request, user_id).await
    }
}
