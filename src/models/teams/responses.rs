use serde::Serialize;
use ts_rs::TS;

use super::entities::{Team, TeamMember};
use crate::models::projects::entities::Project;

// 队伍详情：成员与项目
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/team.ts")]
pub struct TeamDetailResponse {
    pub team: Team,
    pub members: Vec<TeamMember>,
    pub project: Option<Project>,
}
