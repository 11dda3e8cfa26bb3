pub mod create;
pub mod delete;
pub mod detail;
pub mod leaderboard;
pub mod list;
pub mod submit;
pub mod update;
pub mod upload;
pub mod validate;

use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::projects::entities::Project;
use crate::models::projects::requests::{
    CreateProjectRequest, LeaderboardQuery, ProjectListQuery, UpdateProjectRequest,
};
use crate::models::users::entities::User;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::error_response;
use crate::storage::Storage;

pub struct ProjectService {
    storage: Option<Arc<dyn Storage>>,
}

impl ProjectService {
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

    /// 读取项目并确认当前用户是所属队伍的成员
    pub(crate) async fn load_owned_project(
        &self,
        request: &HttpRequest,
        project_id: i64,
        user_id: i64,
    ) -> Result<Project, HttpResponse> {
        let storage = self.get_storage(request);
        let project = match storage.get_project_by_id(project_id).await {
            Ok(Some(project)) => project,
            Ok(None) => {
                return Err(HttpResponse::NotFound().json(ApiResponse::error_empty(
                    ErrorCode::ProjectNotFound,
                    "Project not found",
                )));
            }
            Err(e) => return Err(error_response(&e, ErrorCode::InternalServerError)),
        };

        match storage.get_team_by_member(user_id).await {
            Ok(Some(team)) if team.id == project.team_id => Ok(project),
            Ok(_) => Err(HttpResponse::Forbidden().json(ApiResponse::error_empty(
                ErrorCode::Forbidden,
                "Only members of the owning team can perform this action",
            ))),
            Err(e) => Err(error_response(&e, ErrorCode::InternalServerError)),
        }
    }

    /// 提交截止后拒绝创建与提交，除非允许迟交
    pub(crate) async fn check_submission_window(
        &self,
        request: &HttpRequest,
    ) -> Result<(), HttpResponse> {
        let storage = self.get_storage(request);
        match storage.get_hackathon_settings().await {
            Ok(Some(settings)) if !settings.accepts_submissions(chrono::Utc::now()) => {
                Err(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                    ErrorCode::SubmissionDeadlinePassed,
                    "The submission deadline has passed",
                )))
            }
            Ok(_) => Ok(()),
            Err(e) => Err(error_response(&e, ErrorCode::InternalServerError)),
        }
    }

    // 创建项目
    pub async fn create_project(
        &self,
        request: &HttpRequest,
        user: &User,
        req: CreateProjectRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_project(self, request, user, req).await
    }

    // 项目列表
    pub async fn list_projects(
        &self,
        request: &HttpRequest,
        query: ProjectListQuery,
    ) -> ActixResult<HttpResponse> {
        list::list_projects(self, request, query).await
    }

    // 排行榜
    pub async fn get_leaderboard(
        &self,
        request: &HttpRequest,
        query: LeaderboardQuery,
    ) -> ActixResult<HttpResponse> {
        leaderboard::get_leaderboard(self, request, query).await
    }

    // 当前用户的项目
    pub async fn get_my_project(
        &self,
        request: &HttpRequest,
        user: &User,
    ) -> ActixResult<HttpResponse> {
        detail::get_my_project(self, request, user).await
    }

    // 项目详情
    pub async fn get_project(
        &self,
        request: &HttpRequest,
        user: &User,
        project_id: i64,
    ) -> ActixResult<HttpResponse> {
        detail::get_project(self, request, user, project_id).await
    }

    // 更新项目
    pub async fn update_project(
        &self,
        request: &HttpRequest,
        user_id: i64,
        project_id: i64,
        req: UpdateProjectRequest,
    ) -> ActixResult<HttpResponse> {
        update::update_project(self, request, user_id, project_id, req).await
    }

    // 提交项目
    pub async fn submit_project(
        &self,
        request: &HttpRequest,
        user_id: i64,
        project_id: i64,
    ) -> ActixResult<HttpResponse> {
        submit::submit_project(self, request, user_id, project_id).await
    }

    // 删除项目
    pub async fn delete_project(
        &self,
        request: &HttpRequest,
        user: &User,
        project_id: i64,
    ) -> ActixResult<HttpResponse> {
        delete::delete_project(self, request, user, project_id).await
    }

    // 上传附件
    pub async fn upload_file(
        &self,
        request: &HttpRequest,
        user_id: i64,
        project_id: i64,
        payload: Multipart,
    ) -> ActixResult<HttpResponse> {
        upload::upload_file(self, request, user_id, project_id, payload).await
    }
}
