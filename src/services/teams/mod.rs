pub mod create;
pub mod delete;
pub mod detail;
pub mod members;
pub mod update;
pub mod validate;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::errors::Result;
use crate::models::teams::entities::{MAX_TEAM_SIZE, Team};
use crate::models::teams::requests::{
    CreateTeamRequest, JoinTeamRequest, TeamListQuery, UpdateTeamRequest,
};
use crate::models::users::entities::User;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::error_response;
use crate::storage::Storage;

pub struct TeamService {
    storage: Option<Arc<dyn Storage>>,
}

/// 赛事配置中的队伍人数上限，未配置时使用全局上限
pub(crate) async fn team_size_limit(storage: &Arc<dyn Storage>) -> Result<i64> {
    Ok(storage
        .get_hackathon_settings()
        .await?
        .map(|settings| settings.max_team_size.min(MAX_TEAM_SIZE))
        .unwrap_or(MAX_TEAM_SIZE))
}

impl TeamService {
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

    /// 读取队伍并确认当前用户是队长
    pub(crate) async fn load_led_team(
        &self,
        request: &HttpRequest,
        team_id: i64,
        user_id: i64,
    ) -> std::result::Result<Team, HttpResponse> {
        let storage = self.get_storage(request);
        match storage.get_team_by_id(team_id).await {
            Ok(Some(team)) if team.is_leader(user_id) => Ok(team),
            Ok(Some(_)) => Err(HttpResponse::Forbidden().json(ApiResponse::error_empty(
                ErrorCode::TeamLeaderRequired,
                "Only the team leader can perform this action",
            ))),
            Ok(None) => Err(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::TeamNotFound,
                "Team not found",
            ))),
            Err(e) => Err(error_response(&e, ErrorCode::TeamOperationFailed)),
        }
    }

    // 创建队伍
    pub async fn create_team(
        &self,
        request: &HttpRequest,
        user: &User,
        req: CreateTeamRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_team(self, request, user, req).await
    }

    // 队伍列表
    pub async fn list_teams(
        &self,
        request: &HttpRequest,
        query: TeamListQuery,
    ) -> ActixResult<HttpResponse> {
        detail::list_teams(self, request, query).await
    }

    // 队伍详情
    pub async fn get_team(
        &self,
        request: &HttpRequest,
        user_id: i64,
        team_id: i64,
    ) -> ActixResult<HttpResponse> {
        detail::get_team(self, request, user_id, team_id).await
    }

    // 当前用户的队伍
    pub async fn get_my_team(
        &self,
        request: &HttpRequest,
        user_id: i64,
    ) -> ActixResult<HttpResponse> {
        detail::get_my_team(self, request, user_id).await
    }

    // 更新队伍
    pub async fn update_team(
        &self,
        request: &HttpRequest,
        user_id: i64,
        team_id: i64,
        req: UpdateTeamRequest,
    ) -> ActixResult<HttpResponse> {
        update::update_team(self, request, user_id, team_id, req).await
    }

    // 通过邀请码加入
    pub async fn join_team(
        &self,
        request: &HttpRequest,
        user: &User,
        req: JoinTeamRequest,
    ) -> ActixResult<HttpResponse> {
        members::join_team(self, request, user, req).await
    }

    // 退出队伍
    pub async fn leave_team(
        &self,
        request: &HttpRequest,
        user_id: i64,
        team_id: i64,
    ) -> ActixResult<HttpResponse> {
        members::leave_team(self, request, user_id, team_id).await
    }

    // 队长移除队员
    pub async fn remove_member(
        &self,
        request: &HttpRequest,
        user_id: i64,
        team_id: i64,
        member_id: i64,
    ) -> ActixResult<HttpResponse> {
        members::remove_member(self, request, user_id, team_id, member_id).await
    }

    // 解散队伍
    pub async fn delete_team(
        &self,
        request: &HttpRequest,
        user_id: i64,
        team_id: i64,
    ) -> ActixResult<HttpResponse> {
        delete::delete_team(self, request, user_id, team_id).await
    }
}
