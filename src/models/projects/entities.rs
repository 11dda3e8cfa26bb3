use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 项目提交状态
#[derive(Debug, Clone, Serialize, PartialEq, Eq, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "../frontend/src/types/generated/project.ts")]
pub enum SubmissionStatus {
    Draft,       // 草稿
    Submitted,   // 已提交，等待评审
    UnderReview, // 评审中
    Reviewed,    // 评审结束
}

impl SubmissionStatus {
    pub const DRAFT: &'static str = "draft";
    pub const SUBMITTED: &'static str = "submitted";
    pub const UNDER_REVIEW: &'static str = "under_review";
    pub const REVIEWED: &'static str = "reviewed";

    /// 评委可以评审的状态
    pub fn evaluable() -> &'static [SubmissionStatus] {
        &[SubmissionStatus::Submitted, SubmissionStatus::UnderReview]
    }

    /// 计入评委工作量统计的状态
    pub fn judged() -> &'static [SubmissionStatus] {
        &[
            SubmissionStatus::Submitted,
            SubmissionStatus::UnderReview,
            SubmissionStatus::Reviewed,
        ]
    }

    /// 出现在排行榜上的状态
    pub fn ranked() -> &'static [SubmissionStatus] {
        &[SubmissionStatus::UnderReview, SubmissionStatus::Reviewed]
    }

    pub fn is_evaluable(&self) -> bool {
        Self::evaluable().contains(self)
    }
}

impl<'de> Deserialize<'de> for SubmissionStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse::<SubmissionStatus>().map_err(|_| {
            serde::de::Error::custom(format!(
                "无效的项目状态: '{s}'. 支持的状态: draft, submitted, under_review, reviewed"
            ))
        })
    }
}

impl std::fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubmissionStatus::Draft => write!(f, "{}", Self::DRAFT),
            SubmissionStatus::Submitted => write!(f, "{}", Self::SUBMITTED),
            SubmissionStatus::UnderReview => write!(f, "{}", Self::UNDER_REVIEW),
            SubmissionStatus::Reviewed => write!(f, "{}", Self::REVIEWED),
        }
    }
}

impl std::str::FromStr for SubmissionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            Self::DRAFT => Ok(SubmissionStatus::Draft),
            Self::SUBMITTED => Ok(SubmissionStatus::Submitted),
            Self::UNDER_REVIEW => Ok(SubmissionStatus::UnderReview),
            Self::REVIEWED => Ok(SubmissionStatus::Reviewed),
            _ => Err(format!("Invalid submission status: {s}")),
        }
    }
}

// 参赛项目
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/project.ts")]
pub struct Project {
    pub id: i64,
    pub team_id: i64,
    pub created_by: Option<i64>,
    pub title: String,
    pub tagline: Option<String>,
    pub description: String,
    pub category: String,
    pub technologies: Vec<String>,
    pub demo_url: Option<String>,
    pub video_url: Option<String>,
    pub github_url: Option<String>,
    pub submission_status: SubmissionStatus,
    pub submitted_at: Option<chrono::DateTime<chrono::Utc>>,
    pub total_score: f64,
    pub average_score: f64,
    pub evaluation_count: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl Project {
    pub fn score(&self) -> ProjectScore {
        ProjectScore {
            project_id: self.id,
            total_score: self.total_score,
            average_score: self.average_score,
            evaluation_count: self.evaluation_count,
            submission_status: self.submission_status.clone(),
        }
    }
}

// 项目得分汇总
//
// total_score 为所有评审 weighted_score 之和，
// average_score = total_score / evaluation_count（无评审时为 0）。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/project.ts")]
pub struct ProjectScore {
    pub project_id: i64,
    pub total_score: f64,
    pub average_score: f64,
    pub evaluation_count: i64,
    pub submission_status: SubmissionStatus,
}

impl ProjectScore {
    /// 两份汇总在浮点误差范围内是否一致
    pub fn matches(&self, other: &ProjectScore) -> bool {
        const EPSILON: f64 = 1e-6;
        self.evaluation_count == other.evaluation_count
            && (self.total_score - other.total_score).abs() < EPSILON
            && (self.average_score - other.average_score).abs() < EPSILON
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parse_and_display() {
        assert_eq!(
            "under_review".parse::<SubmissionStatus>().unwrap(),
            SubmissionStatus::UnderReview
        );
        assert_eq!(SubmissionStatus::Reviewed.to_string(), "reviewed");
        assert!("archived".parse::<SubmissionStatus>().is_err());
    }

    #[test]
    fn test_evaluable_statuses() {
        assert!(!SubmissionStatus::Draft.is_evaluable());
        assert!(SubmissionStatus::Submitted.is_evaluable());
        assert!(SubmissionStatus::UnderReview.is_evaluable());
        assert!(!SubmissionStatus::Reviewed.is_evaluable());
    }

    #[test]
    fn test_score_matches_within_epsilon() {
        let a = ProjectScore {
            project_id: 1,
            total_score: 135.0,
            average_score: 67.5,
            evaluation_count: 2,
            submission_status: SubmissionStatus::UnderReview,
        };
        let mut b = a.clone();
        b.total_score += 1e-9;
        assert!(a.matches(&b));
        b.evaluation_count = 3;
        assert!(!a.matches(&b));
    }
}
