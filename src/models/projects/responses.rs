use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::entities::Project;
use crate::models::common::PaginationInfo;
use crate::models::evaluations::entities::Evaluation;
use crate::models::files::entities::ProjectFile;

// 项目详情响应
//
// evaluations 仅对项目所属队伍成员、评委和管理员可见。
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/project.ts")]
pub struct ProjectDetailResponse {
    pub project: Project,
    pub files: Vec<ProjectFile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evaluations: Option<Vec<Evaluation>>,
}

// 项目列表响应
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/project.ts")]
pub struct ProjectListResponse {
    pub items: Vec<Project>,
    pub pagination: PaginationInfo,
}

// 排行榜条目
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/project.ts")]
pub struct LeaderboardEntry {
    pub rank: u64,
    pub project_id: i64,
    pub team_name: String,
    pub title: String,
    pub category: String,
    pub average_score: f64,
    pub evaluation_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/project.ts")]
pub struct LeaderboardResponse {
    pub items: Vec<LeaderboardEntry>,
    pub generated_at: chrono::DateTime<chrono::Utc>,
}
