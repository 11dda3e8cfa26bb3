use serde::Deserialize;
use ts_rs::TS;

// 创建队伍请求
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/team.ts")]
pub struct CreateTeamRequest {
    pub name: String,
    /// 赛道 slug
    pub category: String,
    pub description: Option<String>,
    pub max_members: Option<i64>,
    #[serde(default)]
    pub required_skills: Vec<String>,
}

// 更新队伍请求（仅队长）
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/team.ts")]
pub struct UpdateTeamRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub max_members: Option<i64>,
    pub required_skills: Option<Vec<String>>,
    pub looking_for_members: Option<bool>,
}

// 通过邀请码加入队伍
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/team.ts")]
pub struct JoinTeamRequest {
    pub invite_code: String,
}

// 队伍列表查询参数
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/team.ts")]
pub struct TeamListQuery {
    pub category: Option<String>,
    pub looking_for_members: Option<bool>,
}
