//! 赛事配置与赛道
//!
//! 读取接口公开；修改接口挂在管理路由下。

pub mod categories;
pub mod settings;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::config::{AppConfig, CriterionWeights};
use crate::models::categories::requests::{CreateCategoryRequest, UpdateCategoryRequest};
use crate::models::hackathon::requests::UpdateHackathonRequest;
use crate::storage::Storage;

pub struct HackathonService {
    storage: Option<Arc<dyn Storage>>,
}

impl HackathonService {
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

    /// 配置行缺失时用于重建的默认权重
    pub(crate) fn get_default_weights(&self) -> &CriterionWeights {
        &AppConfig::get().scoring.default_weights
    }

    // 赛事配置
    pub async fn get_settings(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        settings::get_settings(self, request).await
    }

    // 修改赛事配置
    pub async fn update_settings(
        &self,
        request: &HttpRequest,
        user_id: i64,
        req: UpdateHackathonRequest,
    ) -> ActixResult<HttpResponse> {
        settings::update_settings(self, request, user_id, req).await
    }

    // 赛道列表
    pub async fn list_categories(
        &self,
        request: &HttpRequest,
        active_only: bool,
    ) -> ActixResult<HttpResponse> {
        categories::list_categories(self, request, active_only).await
    }

    // 创建赛道
    pub async fn create_category(
        &self,
        request: &HttpRequest,
        req: CreateCategoryRequest,
    ) -> ActixResult<HttpResponse> {
        categories::create_category(self, request, req).await
    }

    // 更新赛道
    pub async fn update_category(
        &self,
        request: &HttpRequest,
        category_id: i64,
        req: UpdateCategoryRequest,
    ) -> ActixResult<HttpResponse> {
        categories::update_category(self, request, category_id, req).await
    }

    // 删除赛道
    pub async fn delete_category(
        &self,
        request: &HttpRequest,
        category_id: i64,
    ) -> ActixResult<HttpResponse> {
        categories::delete_category(self, request, category_id).await
    }
}
