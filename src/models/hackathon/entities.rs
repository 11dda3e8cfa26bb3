use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::config::CriterionWeights;

// 赛事配置（单条记录）
//
// judging_weights 是新评审在未指定权重时采用的默认权重。
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/hackathon.ts")]
pub struct HackathonSettings {
    pub name: String,
    pub tagline: Option<String>,
    pub theme: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<chrono::DateTime<chrono::Utc>>,
    pub end_date: Option<chrono::DateTime<chrono::Utc>>,
    pub submission_deadline: Option<chrono::DateTime<chrono::Utc>>,
    pub judging_start_date: Option<chrono::DateTime<chrono::Utc>>,
    pub judging_end_date: Option<chrono::DateTime<chrono::Utc>>,
    pub max_team_size: i64,
    #[ts(type = "{ innovation: number, technical: number, implementation: number, impact: number }")]
    pub judging_weights: CriterionWeights,
    pub allow_late_submissions: bool,
    pub enable_leaderboard: bool,
    pub updated_at: chrono::DateTime<chrono::Utc>,
    pub updated_by: Option<i64>,
}

impl HackathonSettings {
    /// 截止时间之前或允许迟交时可以提交项目
    pub fn accepts_submissions(&self, now: chrono::DateTime<chrono::Utc>) -> bool {
        self.allow_late_submissions || self.submission_deadline.is_none_or(|deadline| now <= deadline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeDelta, Utc};

    fn settings(deadline: Option<chrono::DateTime<Utc>>, allow_late: bool) -> HackathonSettings {
        HackathonSettings {
            name: "HackFlow".to_string(),
            tagline: None,
            theme: None,
            description: None,
            start_date: None,
            end_date: None,
            submission_deadline: deadline,
            judging_start_date: None,
            judging_end_date: None,
            max_team_size: 4,
            judging_weights: CriterionWeights::default(),
            allow_late_submissions: allow_late,
            enable_leaderboard: true,
            updated_at: Utc::now(),
            updated_by: None,
        }
    }

    #[test]
    fn test_submission_window() {
        let now = Utc::now();
        assert!(settings(None, false).accepts_submissions(now));
        assert!(settings(Some(now + TimeDelta::hours(1)), false).accepts_submissions(now));
        assert!(!settings(Some(now - TimeDelta::hours(1)), false).accepts_submissions(now));
        assert!(settings(Some(now - TimeDelta::hours(1)), true).accepts_submissions(now));
    }
}
