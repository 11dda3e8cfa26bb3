use serde::Serialize;
use ts_rs::TS;

use crate::models::evaluations::entities::Evaluation;
use crate::models::projects::entities::Project;

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/judge.ts")]
pub struct JudgeProjectItem {
    pub project: Project,
    pub my_evaluation: Option<Evaluation>,
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/judge.ts")]
pub struct JudgeEvaluationItem {
    pub evaluation: Evaluation,
    pub project_title: String,
    pub project_category: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/judge.ts")]
pub struct JudgeStatsResponse {
    pub total_projects: u64,
    pub evaluated: u64,
    pub pending: u64,
    /// 百分比，保留两位小数
    pub completion_rate: f64,
}

impl JudgeStatsResponse {
    pub fn from_counts(total_projects: u64, evaluated: u64) -> Self {
        let completion_rate = if total_projects > 0 {
            ((evaluated as f64 / total_projects as f64) * 10000.0).round() / 100.0
        } else {
            0.0
        };
        Self {
            total_projects,
            evaluated,
            pending: total_projects.saturating_sub(evaluated),
            completion_rate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_from_counts() {
        let stats = JudgeStatsResponse::from_counts(3, 1);
        assert_eq!(stats.pending, 2);
        assert_eq!(stats.completion_rate, 33.33);

        let empty = JudgeStatsResponse::from_counts(0, 0);
        assert_eq!(empty.completion_rate, 0.0);
        assert_eq!(empty.pending, 0);
    }
}
