use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use super::JudgeService;
use crate::errors::Result;
use crate::models::judge::responses::JudgeStatsResponse;
use crate::models::projects::entities::SubmissionStatus;
use crate::models::{ApiResponse, ErrorCode};
use crate::storage::Storage;

/// 评委进度：总数包含已结束评审的项目
pub(crate) async fn collect_stats(
    storage: &Arc<dyn Storage>,
    judge_id: i64,
) -> Result<JudgeStatsResponse> {
    let total = storage
        .count_projects_in_statuses(SubmissionStatus::judged())
        .await?;
    let evaluated = storage.count_evaluations_by_judge(judge_id).await?;
    Ok(JudgeStatsResponse::from_counts(total, evaluated))
}

pub async fn get_stats(
    service: &JudgeService,
    request: &HttpRequest,
    judge_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match collect_stats(&storage, judge_id).await {
        Ok(stats) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            stats,
            "Statistics retrieved successfully",
        ))),
        Err(e) => Ok(
            HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::InternalServerError,
                format!("Failed to collect statistics: {e}"),
            )),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScoringConfig;
    use crate::models::evaluations::requests::{CriterionInput, ScoresInput};
    use crate::models::judge::requests::JudgeProjectQuery;
    use crate::models::users::entities::UserRole;
    use crate::services::evaluations::{scoring::EvaluationPatch, workflow};
    use crate::storage::sea_orm_storage::testing::{
        memory_storage, seed_submitted_project, seed_user,
    };

    fn uniform(score: f64) -> EvaluationPatch {
        let input = Some(CriterionInput {
            score: Some(score),
            weight: None,
        });
        EvaluationPatch::parse(
            &ScoresInput {
                innovation: input,
                technical: input,
                implementation: input,
                impact: input,
            },
            None,
            None,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_judge_progress() {
        let storage = memory_storage().await;
        let scoring = ScoringConfig::default();
        let judge = seed_user(&storage, "judge", UserRole::Judge).await;
        let mut projects = Vec::new();
        for idx in 0..3 {
            let owner = seed_user(&storage, &format!("owner_{idx}"), UserRole::Participant).await;
            projects.push(seed_submitted_project(&storage, owner, &format!("Project {idx}")).await);
        }

        workflow::submit_evaluation(&storage, &scoring, judge, projects[0].id, uniform(7.0))
            .await
            .unwrap();

        let stats = collect_stats(&storage, judge).await.unwrap();
        assert_eq!(stats, JudgeStatsResponse::from_counts(3, 1));

        let pending = storage
            .list_judgeable_projects(
                judge,
                JudgeProjectQuery {
                    category: None,
                    evaluated: Some(false),
                },
            )
            .await
            .unwrap();
        assert_eq!(pending.len(), 2);
        assert!(pending.iter().all(|item| item.my_evaluation.is_none()));

        let done = storage
            .list_judgeable_projects(
                judge,
                JudgeProjectQuery {
                    category: Some("web".to_string()),
                    evaluated: Some(true),
                },
            )
            .await
            .unwrap();
        assert_eq!(done.len(), 1);
        assert_eq!(done[0].project.id, projects[0].id);
        assert!(done[0].my_evaluation.is_some());

        let mine = storage.list_evaluations_by_judge(judge).await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].project_title, "Project 0");
    }
}
