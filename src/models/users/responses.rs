use super::entities::{User, UserProfile, UserRole};
use crate::models::projects::entities::Project;
use crate::models::teams::entities::Team;
use crate::models::common::PaginationInfo;
use serde::Serialize;
use ts_rs::TS;

// 管理端用户列表
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/user.ts")]
pub struct UserListResponse {
    pub items: Vec<User>,
    pub pagination: PaginationInfo,
}

// 队伍摘要
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/user.ts")]
pub struct TeamSummary {
    pub id: i64,
    pub name: String,
    pub category: String,
}

impl From<&Team> for TeamSummary {
    fn from(team: &Team) -> Self {
        Self {
            id: team.id,
            name: team.name.clone(),
            category: team.category.clone(),
        }
    }
}

// 公开用户资料（不含邮箱）
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/user.ts")]
pub struct PublicProfileResponse {
    pub id: i64,
    pub username: String,
    pub role: UserRole,
    pub profile: UserProfile,
    pub team: Option<TeamSummary>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl PublicProfileResponse {
    pub fn new(user: User, team: Option<&Team>) -> Self {
        Self {
            id: user.id,
            username: user.username,
            role: user.role,
            profile: user.profile,
            team: team.map(TeamSummary::from),
            created_at: user.created_at,
        }
    }
}

// 当前用户的参赛概况
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/user.ts")]
pub struct UserStatsResponse {
    pub team: Option<TeamSummary>,
    pub is_team_leader: bool,
    pub team_member_count: i64,
    pub project: Option<Project>,
    pub evaluations_submitted: u64,
    pub unread_notifications: u64,
}
