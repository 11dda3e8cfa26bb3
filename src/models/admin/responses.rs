use serde::Serialize;
use ts_rs::TS;

use crate::models::projects::entities::ProjectScore;

// 重算项目得分的结果
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/admin.ts")]
pub struct RecalculateResponse {
    pub previous: ProjectScore,
    pub current: ProjectScore,
    pub drift_detected: bool,
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/admin.ts")]
pub struct LabelCount {
    pub label: String,
    pub count: i64,
}

// 管理后台概览
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/admin.ts")]
pub struct DashboardStats {
    pub total_users: u64,
    pub users_by_role: Vec<LabelCount>,
    pub total_teams: u64,
    pub projects_by_status: Vec<LabelCount>,
    pub total_evaluations: u64,
    pub complete_evaluations: u64,
}
