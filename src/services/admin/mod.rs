pub mod dashboard;
pub mod export;
pub mod projects;
pub mod submissions;
pub mod users;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::admin::requests::{UpdateUserRoleRequest, UpdateUserStatusRequest};
use crate::models::projects::requests::ProjectListQuery;
use crate::models::users::requests::UserListQuery;
use crate::storage::Storage;

pub struct AdminService {
    storage: Option<Arc<dyn Storage>>,
}

impl AdminService {
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

    // 管理后台概览
    pub async fn get_dashboard(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        dashboard::get_dashboard(self, request).await
    }

    // 用户列表
    pub async fn list_users(
        &self,
        request: &HttpRequest,
        query: UserListQuery,
    ) -> ActixResult<HttpResponse> {
        users::list_users(self, request, query).await
    }

    // 修改用户角色
    pub async fn update_user_role(
        &self,
        request: &HttpRequest,
        operator_id: i64,
        user_id: i64,
        req: UpdateUserRoleRequest,
    ) -> ActixResult<HttpResponse> {
        users::update_user_role(self, request, operator_id, user_id, req).await
    }

    // 修改用户状态
    pub async fn update_user_status(
        &self,
        request: &HttpRequest,
        operator_id: i64,
        user_id: i64,
        req: UpdateUserStatusRequest,
    ) -> ActixResult<HttpResponse> {
        users::update_user_status(self, request, operator_id, user_id, req).await
    }

    // 重算项目得分
    pub async fn recalculate_project(
        &self,
        request: &HttpRequest,
        project_id: i64,
    ) -> ActixResult<HttpResponse> {
        projects::recalculate_project(self, request, project_id).await
    }

    // 结束项目评审
    pub async fn finalize_project(
        &self,
        request: &HttpRequest,
        project_id: i64,
    ) -> ActixResult<HttpResponse> {
        projects::finalize_project(self, request, project_id).await
    }

    // 全部提交（含草稿）
    pub async fn list_submissions(
        &self,
        request: &HttpRequest,
        query: ProjectListQuery,
    ) -> ActixResult<HttpResponse> {
        submissions::list_submissions(self, request, query).await
    }

    // 导出数据
    pub async fn export_data(&self, request: &HttpRequest, kind: &str) -> ActixResult<HttpResponse> {
        export::export_data(self, request, kind).await
    }
}
