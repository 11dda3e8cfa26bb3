use serde::Deserialize;
use ts_rs::TS;

use super::entities::Recommendation;

// 单项评分输入，weight 缺省时使用默认权重（更新时沿用原权重）
#[derive(Debug, Clone, Copy, Default, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/evaluation.ts")]
pub struct CriterionInput {
    pub score: Option<f64>,
    pub weight: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/evaluation.ts")]
pub struct ScoresInput {
    pub innovation: Option<CriterionInput>,
    pub technical: Option<CriterionInput>,
    pub implementation: Option<CriterionInput>,
    pub impact: Option<CriterionInput>,
}

#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/evaluation.ts")]
pub struct FeedbackInput {
    pub strengths: Option<String>,
    pub improvements: Option<String>,
    #[serde(alias = "generalComments")]
    pub general_comments: Option<String>,
}

// 提交评审请求
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/evaluation.ts")]
pub struct SubmitEvaluationRequest {
    #[serde(alias = "project")]
    pub project_id: i64,
    #[serde(default)]
    pub scores: ScoresInput,
    pub feedback: Option<FeedbackInput>,
    pub recommendation: Option<Recommendation>,
}

// 修改评审请求
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/evaluation.ts")]
pub struct UpdateEvaluationRequest {
    #[serde(default)]
    pub scores: ScoresInput,
    pub feedback: Option<FeedbackInput>,
    pub recommendation: Option<Recommendation>,
}
