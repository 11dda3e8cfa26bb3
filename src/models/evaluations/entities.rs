use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::models::projects::entities::ProjectScore;

// 评审推荐意见
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "../frontend/src/types/generated/evaluation.ts")]
pub enum Recommendation {
    HighlyRecommend,
    Recommend,
    #[default]
    Neutral,
    NotRecommend,
}

impl<'de> Deserialize<'de> for Recommendation {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse::<Recommendation>().map_err(|_| {
            serde::de::Error::custom(format!(
                "无效的推荐意见: '{s}'. 支持: highly_recommend, recommend, neutral, not_recommend"
            ))
        })
    }
}

impl std::fmt::Display for Recommendation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Recommendation::HighlyRecommend => write!(f, "highly_recommend"),
            Recommendation::Recommend => write!(f, "recommend"),
            Recommendation::Neutral => write!(f, "neutral"),
            Recommendation::NotRecommend => write!(f, "not_recommend"),
        }
    }
}

impl std::str::FromStr for Recommendation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "highly_recommend" => Ok(Recommendation::HighlyRecommend),
            "recommend" => Ok(Recommendation::Recommend),
            "neutral" => Ok(Recommendation::Neutral),
            "not_recommend" => Ok(Recommendation::NotRecommend),
            _ => Err(format!("Invalid recommendation: {s}")),
        }
    }
}

// 单项评分：score 缺省表示尚未打分，0 是有效分数
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/evaluation.ts")]
pub struct CriterionScore {
    pub score: Option<f64>,
    pub weight: f64,
}

impl CriterionScore {
    pub fn new(score: Option<f64>, weight: f64) -> Self {
        Self { score, weight }
    }
}

// 四项评分维度
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/evaluation.ts")]
pub struct ScoreSheet {
    pub innovation: CriterionScore,
    pub technical: CriterionScore,
    pub implementation: CriterionScore,
    pub impact: CriterionScore,
}

impl ScoreSheet {
    pub fn criteria(&self) -> [&CriterionScore; 4] {
        [
            &self.innovation,
            &self.technical,
            &self.implementation,
            &self.impact,
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/evaluation.ts")]
pub struct Feedback {
    pub strengths: Option<String>,
    pub improvements: Option<String>,
    pub general_comments: Option<String>,
}

// 评审记录
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/evaluation.ts")]
pub struct Evaluation {
    pub id: i64,
    pub project_id: i64,
    pub judge_id: i64,
    pub scores: ScoreSheet,
    pub total_score: f64,
    pub weighted_score: f64,
    pub feedback: Feedback,
    pub recommendation: Recommendation,
    pub is_complete: bool,
    pub submitted_at: Option<chrono::DateTime<chrono::Utc>>,
    pub version: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

// 待持久化的评审内容（派生字段已计算完毕）
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationRecord {
    pub scores: ScoreSheet,
    pub total_score: f64,
    pub weighted_score: f64,
    pub feedback: Feedback,
    pub recommendation: Recommendation,
    pub is_complete: bool,
    pub submitted_at: Option<i64>,
}

// 评审写入结果：评审本身与写入后的项目汇总
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/evaluation.ts")]
pub struct EvaluationOutcome {
    pub evaluation: Evaluation,
    pub project_score: ProjectScore,
}
