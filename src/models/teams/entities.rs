use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// 邀请码长度
pub const INVITE_CODE_LEN: usize = 6;
/// 队伍人数上下限（含队长）
pub const MIN_TEAM_SIZE: i64 = 1;
pub const MAX_TEAM_SIZE: i64 = 6;
pub const DEFAULT_TEAM_SIZE: i64 = 4;

// 队内角色
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "../frontend/src/types/generated/team.ts")]
pub enum TeamRole {
    Leader,
    Member,
}

impl TeamRole {
    pub const LEADER: &'static str = "leader";
    pub const MEMBER: &'static str = "member";
}

impl std::fmt::Display for TeamRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TeamRole::Leader => write!(f, "{}", Self::LEADER),
            TeamRole::Member => write!(f, "{}", Self::MEMBER),
        }
    }
}

impl std::str::FromStr for TeamRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            Self::LEADER => Ok(TeamRole::Leader),
            Self::MEMBER => Ok(TeamRole::Member),
            _ => Err(format!("Invalid team role: {s}")),
        }
    }
}

// 参赛队伍
//
// member_count 包含队长；invite_code 只对队员可见。
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/team.ts")]
pub struct Team {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub category: String,
    pub leader_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invite_code: Option<String>,
    pub max_members: i64,
    pub member_count: i64,
    pub looking_for_members: bool,
    pub required_skills: Vec<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl Team {
    pub fn is_full(&self) -> bool {
        self.member_count >= self.max_members
    }

    pub fn is_leader(&self, user_id: i64) -> bool {
        self.leader_id == user_id
    }

    /// 隐去邀请码，用于非队员视图
    pub fn without_invite_code(mut self) -> Self {
        self.invite_code = None;
        self
    }
}

// 队员信息
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/team.ts")]
pub struct TeamMember {
    pub user_id: i64,
    pub username: String,
    pub display_name: String,
    pub avatar_url: Option<String>,
    pub role: TeamRole,
    pub joined_at: chrono::DateTime<chrono::Utc>,
}

/// 生成 6 位大写字母数字邀请码
pub fn generate_invite_code() -> String {
    use rand::Rng;
    const CHARSET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
    let mut rng = rand::rng();
    (0..INVITE_CODE_LEN)
        .map(|_| CHARSET[rng.random_range(0..CHARSET.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invite_code_shape() {
        let code = generate_invite_code();
        assert_eq!(code.len(), INVITE_CODE_LEN);
        assert!(
            code.chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
        );
    }

    #[test]
    fn test_full_counts_leader() {
        let team = Team {
            id: 1,
            name: "Rustaceans".to_string(),
            description: None,
            category: "web".to_string(),
            leader_id: 7,
            invite_code: Some("ABC234".to_string()),
            max_members: 2,
            member_count: 2,
            looking_for_members: true,
            required_skills: vec![],
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        };
        assert!(team.is_full());
        assert!(team.is_leader(7));

        let public = serde_json::to_value(team.without_invite_code()).unwrap();
        assert!(public.get("invite_code").is_none());
    }

    #[test]
    fn test_role_parsing() {
        assert_eq!("leader".parse::<TeamRole>().unwrap(), TeamRole::Leader);
        assert_eq!(TeamRole::Member.to_string(), "member");
        assert!("captain".parse::<TeamRole>().is_err());
    }
}
