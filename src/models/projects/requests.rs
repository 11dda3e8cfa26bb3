use serde::Deserialize;
use ts_rs::TS;

use super::entities::SubmissionStatus;
use crate::models::common::PaginationQuery;

// 创建项目请求，赛道沿用所在队伍的赛道
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/project.ts")]
pub struct CreateProjectRequest {
    pub title: String,
    pub tagline: Option<String>,
    pub description: String,
    #[serde(default)]
    pub technologies: Vec<String>,
    pub demo_url: Option<String>,
    pub video_url: Option<String>,
    pub github_url: Option<String>,
}

// 更新项目请求（仅草稿状态可更新）
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/project.ts")]
pub struct UpdateProjectRequest {
    pub title: Option<String>,
    pub tagline: Option<String>,
    pub description: Option<String>,
    pub technologies: Option<Vec<String>>,
    pub demo_url: Option<String>,
    pub video_url: Option<String>,
    pub github_url: Option<String>,
}

// 项目列表查询参数（来自HTTP请求）
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/project.ts")]
pub struct ProjectListParams {
    #[serde(flatten)]
    #[ts(flatten)]
    pub pagination: PaginationQuery,
    pub status: Option<SubmissionStatus>,
    pub category: Option<String>,
    pub search: Option<String>,
}

// 项目列表查询参数（用于存储层）
#[derive(Debug, Clone, Default)]
pub struct ProjectListQuery {
    pub page: Option<i64>,
    pub size: Option<i64>,
    pub statuses: Vec<SubmissionStatus>,
    pub category: Option<String>,
    pub search: Option<String>,
}

impl From<ProjectListParams> for ProjectListQuery {
    fn from(params: ProjectListParams) -> Self {
        Self {
            page: Some(params.pagination.page),
            size: Some(params.pagination.size),
            statuses: params.status.into_iter().collect(),
            category: params.category,
            search: params.search,
        }
    }
}

// 排行榜查询参数
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/project.ts")]
pub struct LeaderboardQuery {
    pub limit: Option<u64>,
}
