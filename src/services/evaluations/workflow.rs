//! 评审提交与修改流程
//!
//! 负责把校验后的输入合成评审记录并交给存储层写入；
//! 存储层在同一事务内完成评审写入与项目得分汇总。

use std::sync::Arc;

use tracing::{info, warn};

use super::scoring::EvaluationPatch;
use crate::config::{CriterionWeights, ScoringConfig};
use crate::errors::HackflowError;
use crate::models::evaluations::{entities::EvaluationOutcome, responses::FieldError};
use crate::services::notifications::notify;
use crate::storage::Storage;

/// 评审流程错误
///
/// 合成记录时的字段错误保留结构化列表，其余错误来自存储层。
#[derive(Debug)]
pub enum EvaluationError {
    Invalid(Vec<FieldError>),
    Failed(HackflowError),
}

impl From<HackflowError> for EvaluationError {
    fn from(err: HackflowError) -> Self {
        EvaluationError::Failed(err)
    }
}

impl std::fmt::Display for EvaluationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EvaluationError::Invalid(errors) => {
                let joined = errors
                    .iter()
                    .map(|e| format!("{}: {}", e.field, e.message))
                    .collect::<Vec<_>>()
                    .join("; ");
                write!(f, "{joined}")
            }
            EvaluationError::Failed(err) => write!(f, "{err}"),
        }
    }
}

pub type EvaluationResult<T> = std::result::Result<T, EvaluationError>;

/// 新评审的默认权重：优先使用赛事配置，缺失时退回配置文件
async fn default_weights(
    storage: &Arc<dyn Storage>,
    scoring: &ScoringConfig,
) -> EvaluationResult<CriterionWeights> {
    Ok(storage
        .get_hackathon_settings()
        .await?
        .map(|settings| settings.judging_weights)
        .unwrap_or(scoring.default_weights))
}

/// 提交新评审
///
/// 每个评委对每个项目只能提交一次，重复提交返回 `DuplicateEvaluation`。
/// 成功后异步通知项目所属队伍，通知失败不影响评审结果。
pub async fn submit_evaluation(
    storage: &Arc<dyn Storage>,
    scoring: &ScoringConfig,
    judge_id: i64,
    project_id: i64,
    patch: EvaluationPatch,
) -> EvaluationResult<EvaluationOutcome> {
    let now = chrono::Utc::now().timestamp();
    let weights = default_weights(storage, scoring).await?;
    let record = patch
        .into_new_record(&weights, now)
        .map_err(EvaluationError::Invalid)?;

    let outcome = storage
        .create_evaluation(project_id, judge_id, record)
        .await?;

    info!(
        "Judge {} evaluated project {}: weighted {:.2}, project average {:.2} over {} evaluation(s)",
        judge_id,
        project_id,
        outcome.evaluation.weighted_score,
        outcome.project_score.average_score,
        outcome.project_score.evaluation_count
    );

    notify::spawn_evaluation_notice(
        storage.clone(),
        project_id,
        outcome.project_score.average_score,
    );

    Ok(outcome)
}

/// 修改评委自己的评审
///
/// 评审不存在或不属于该评委时返回 `NotFound`。
/// 版本冲突时重新读取并重算，最多重试 `max_update_retries` 次。
pub async fn update_evaluation(
    storage: &Arc<dyn Storage>,
    scoring: &ScoringConfig,
    judge_id: i64,
    evaluation_id: i64,
    patch: EvaluationPatch,
) -> EvaluationResult<EvaluationOutcome> {
    let mut attempt: u32 = 0;

    loop {
        let existing = storage
            .get_evaluation_by_id(evaluation_id)
            .await?
            .filter(|e| e.judge_id == judge_id)
            .ok_or_else(|| HackflowError::not_found("Evaluation not found"))?;

        let now = chrono::Utc::now().timestamp();
        let record = patch
            .clone()
            .merge_into(&existing, now)
            .map_err(EvaluationError::Invalid)?;

        match storage
            .update_evaluation(evaluation_id, existing.version, record)
            .await
        {
            Err(HackflowError::Conflict(msg)) if attempt < scoring.max_update_retries => {
                attempt += 1;
                warn!(
                    "Evaluation {} update conflict (attempt {}): {}",
                    evaluation_id, attempt, msg
                );
            }
            Ok(outcome) => {
                info!(
                    "Judge {} updated evaluation {} (v{}): project {} average {:.2}",
                    judge_id,
                    evaluation_id,
                    outcome.evaluation.version,
                    outcome.project_score.project_id,
                    outcome.project_score.average_score
                );
                return Ok(outcome);
            }
            Err(e) => return Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::evaluations::requests::{CriterionInput, FeedbackInput, ScoresInput};
    use crate::models::projects::entities::SubmissionStatus;
    use crate::models::users::entities::UserRole;
    use crate::storage::sea_orm_storage::testing::{
        memory_storage, seed_submitted_project, seed_team, seed_user,
    };

    fn patch(values: [f64; 4]) -> EvaluationPatch {
        let input = |score: f64| {
            Some(CriterionInput {
                score: Some(score),
                weight: None,
            })
        };
        EvaluationPatch::parse(
            &ScoresInput {
                innovation: input(values[0]),
                technical: input(values[1]),
                implementation: input(values[2]),
                impact: input(values[3]),
            },
            None,
            None,
        )
        .expect("valid scores")
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    async fn assert_no_drift(storage: &Arc<dyn Storage>, project_id: i64) {
        let stored = storage
            .get_project_by_id(project_id)
            .await
            .unwrap()
            .unwrap()
            .score();
        let recomputed = storage.compute_project_score(project_id).await.unwrap();
        assert!(
            stored.matches(&recomputed),
            "stored {stored:?} drifted from recomputed {recomputed:?}"
        );
    }

    #[tokio::test]
    async fn test_scoring_scenario() {
        let storage = memory_storage().await;
        let scoring = ScoringConfig::default();
        let owner = seed_user(&storage, "owner", UserRole::Participant).await;
        let judge_a = seed_user(&storage, "judge_a", UserRole::Judge).await;
        let judge_b = seed_user(&storage, "judge_b", UserRole::Judge).await;
        let project = seed_submitted_project(&storage, owner, "Rocket").await;

        let first = submit_evaluation(&storage, &scoring, judge_a, project.id, patch([8.0, 7.0, 9.0, 6.0]))
            .await
            .unwrap();
        assert!(approx(first.evaluation.weighted_score, 75.0));
        assert!(approx(first.project_score.total_score, 75.0));
        assert!(approx(first.project_score.average_score, 75.0));
        assert_eq!(first.project_score.evaluation_count, 1);
        assert_eq!(
            first.project_score.submission_status,
            SubmissionStatus::UnderReview
        );
        assert_no_drift(&storage, project.id).await;

        let second = submit_evaluation(&storage, &scoring, judge_b, project.id, patch([6.0; 4]))
            .await
            .unwrap();
        assert!(approx(second.evaluation.weighted_score, 60.0));
        assert!(approx(second.project_score.total_score, 135.0));
        assert!(approx(second.project_score.average_score, 67.5));
        assert_eq!(second.project_score.evaluation_count, 2);
        assert_no_drift(&storage, project.id).await;

        let edited = update_evaluation(
            &storage,
            &scoring,
            judge_a,
            first.evaluation.id,
            patch([10.0; 4]),
        )
        .await
        .unwrap();
        assert!(approx(edited.evaluation.weighted_score, 100.0));
        assert_eq!(edited.evaluation.version, 2);
        assert!(approx(edited.project_score.total_score, 160.0));
        assert!(approx(edited.project_score.average_score, 80.0));
        assert_eq!(edited.project_score.evaluation_count, 2);
        assert_eq!(
            edited.evaluation.submitted_at,
            first.evaluation.submitted_at
        );
        assert_no_drift(&storage, project.id).await;
    }

    #[tokio::test]
    async fn test_duplicate_evaluation_rejected() {
        let storage = memory_storage().await;
        let scoring = ScoringConfig::default();
        let owner = seed_user(&storage, "owner", UserRole::Participant).await;
        let judge = seed_user(&storage, "judge", UserRole::Judge).await;
        let project = seed_submitted_project(&storage, owner, "Dup").await;

        submit_evaluation(&storage, &scoring, judge, project.id, patch([5.0; 4]))
            .await
            .unwrap();
        let err = submit_evaluation(&storage, &scoring, judge, project.id, patch([9.0; 4]))
            .await
            .unwrap_err();
        assert!(matches!(err, EvaluationError::Failed(HackflowError::DuplicateEvaluation(_))));

        // 重复提交不影响汇总
        let score = storage.compute_project_score(project.id).await.unwrap();
        assert_eq!(score.evaluation_count, 1);
        assert!(approx(score.total_score, 50.0));
        assert_no_drift(&storage, project.id).await;
    }

    #[tokio::test]
    async fn test_missing_project_is_not_found() {
        let storage = memory_storage().await;
        let scoring = ScoringConfig::default();
        let judge = seed_user(&storage, "judge", UserRole::Judge).await;

        let err = submit_evaluation(&storage, &scoring, judge, 404, patch([5.0; 4]))
            .await
            .unwrap_err();
        assert!(matches!(err, EvaluationError::Failed(HackflowError::NotFound(_))));
        assert_eq!(storage.count_evaluations(false).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_draft_project_not_evaluable() {
        let storage = memory_storage().await;
        let scoring = ScoringConfig::default();
        let owner = seed_user(&storage, "owner", UserRole::Participant).await;
        let judge = seed_user(&storage, "judge", UserRole::Judge).await;
        let team = seed_team(&storage, owner, "Drafters").await;
        let draft = storage
            .create_project(
                team.id,
                owner,
                crate::models::projects::requests::CreateProjectRequest {
                    title: "Draft".to_string(),
                    tagline: None,
                    description: "wip".to_string(),
                    technologies: vec![],
                    demo_url: None,
                    video_url: None,
                    github_url: None,
                },
            )
            .await
            .unwrap();

        let err = submit_evaluation(&storage, &scoring, judge, draft.id, patch([5.0; 4]))
            .await
            .unwrap_err();
        assert!(matches!(err, EvaluationError::Failed(HackflowError::InvalidState(_))));
    }

    #[tokio::test]
    async fn test_update_requires_ownership() {
        let storage = memory_storage().await;
        let scoring = ScoringConfig::default();
        let owner = seed_user(&storage, "owner", UserRole::Participant).await;
        let judge = seed_user(&storage, "judge", UserRole::Judge).await;
        let other = seed_user(&storage, "other", UserRole::Judge).await;
        let project = seed_submitted_project(&storage, owner, "Mine").await;

        let outcome = submit_evaluation(&storage, &scoring, judge, project.id, patch([5.0; 4]))
            .await
            .unwrap();

        let err = update_evaluation(&storage, &scoring, other, outcome.evaluation.id, patch([1.0; 4]))
            .await
            .unwrap_err();
        assert!(matches!(err, EvaluationError::Failed(HackflowError::NotFound(_))));

        let err = update_evaluation(&storage, &scoring, judge, 9999, patch([1.0; 4]))
            .await
            .unwrap_err();
        assert!(matches!(err, EvaluationError::Failed(HackflowError::NotFound(_))));
        assert_no_drift(&storage, project.id).await;
    }

    #[tokio::test]
    async fn test_update_keeps_feedback_when_omitted() {
        let storage = memory_storage().await;
        let scoring = ScoringConfig::default();
        let owner = seed_user(&storage, "owner", UserRole::Participant).await;
        let judge = seed_user(&storage, "judge", UserRole::Judge).await;
        let project = seed_submitted_project(&storage, owner, "Notes").await;

        let with_feedback = EvaluationPatch::parse(
            &ScoresInput {
                innovation: Some(CriterionInput {
                    score: Some(7.0),
                    weight: None,
                }),
                technical: Some(CriterionInput {
                    score: Some(7.0),
                    weight: None,
                }),
                implementation: Some(CriterionInput {
                    score: Some(7.0),
                    weight: None,
                }),
                impact: Some(CriterionInput {
                    score: Some(7.0),
                    weight: None,
                }),
            },
            Some(FeedbackInput {
                strengths: Some("great pitch".to_string()),
                improvements: None,
                general_comments: None,
            }),
            None,
        )
        .unwrap();

        let created = submit_evaluation(&storage, &scoring, judge, project.id, with_feedback)
            .await
            .unwrap();
        let updated = update_evaluation(&storage, &scoring, judge, created.evaluation.id, patch([8.0; 4]))
            .await
            .unwrap();

        assert_eq!(
            updated.evaluation.feedback.strengths.as_deref(),
            Some("great pitch")
        );
        assert!(approx(updated.project_score.average_score, 80.0));
    }

    #[tokio::test]
    async fn test_stale_version_conflicts() {
        let storage = memory_storage().await;
        let scoring = ScoringConfig::default();
        let owner = seed_user(&storage, "owner", UserRole::Participant).await;
        let judge = seed_user(&storage, "judge", UserRole::Judge).await;
        let project = seed_submitted_project(&storage, owner, "Race").await;

        let created = submit_evaluation(&storage, &scoring, judge, project.id, patch([5.0; 4]))
            .await
            .unwrap();
        let record = patch([9.0; 4])
            .merge_into(&created.evaluation, 0)
            .unwrap();

        storage
            .update_evaluation(created.evaluation.id, 1, record.clone())
            .await
            .unwrap();
        // 第二次使用旧版本号写入
        let err = storage
            .update_evaluation(created.evaluation.id, 1, record)
            .await
            .unwrap_err();
        assert!(matches!(err, HackflowError::Conflict(_)));
        assert_no_drift(&storage, project.id).await;
    }

    #[tokio::test]
    async fn test_concurrent_submissions_do_not_lose_updates() {
        let storage = memory_storage().await;
        let scoring = ScoringConfig::default();
        let owner = seed_user(&storage, "owner", UserRole::Participant).await;
        let project = seed_submitted_project(&storage, owner, "Crowd").await;

        let mut judges = Vec::new();
        for idx in 0..6 {
            judges.push(seed_user(&storage, &format!("judge_{idx}"), UserRole::Judge).await);
        }

        let submissions = judges.iter().enumerate().map(|(idx, judge)| {
            let storage = storage.clone();
            let scoring = scoring.clone();
            let judge = *judge;
            let project_id = project.id;
            tokio::spawn(async move {
                submit_evaluation(&storage, &scoring, judge, project_id, patch([idx as f64; 4]))
                    .await
            })
        });

        for result in futures_util::future::join_all(submissions).await {
            result.expect("task should not panic").expect("submission should succeed");
        }

        let score = storage.compute_project_score(project.id).await.unwrap();
        assert_eq!(score.evaluation_count, 6);
        // 0+10+20+30+40+50
        assert!(approx(score.total_score, 150.0));
        assert_no_drift(&storage, project.id).await;
    }

    #[tokio::test]
    async fn test_recalculate_repairs_drift() {
        let storage = memory_storage().await;
        let scoring = ScoringConfig::default();
        let owner = seed_user(&storage, "owner", UserRole::Participant).await;
        let judge = seed_user(&storage, "judge", UserRole::Judge).await;
        let project = seed_submitted_project(&storage, owner, "Repair").await;

        submit_evaluation(&storage, &scoring, judge, project.id, patch([8.0, 7.0, 9.0, 6.0]))
            .await
            .unwrap();

        let (previous, current) = storage.recalculate_project_score(project.id).await.unwrap();
        assert!(previous.matches(&current));
        assert!(approx(current.average_score, 75.0));
    }

    #[tokio::test]
    async fn test_weight_sum_error_keeps_field_list() {
        let storage = memory_storage().await;
        let scoring = ScoringConfig::default();
        let owner = seed_user(&storage, "owner", UserRole::Participant).await;
        let judge = seed_user(&storage, "judge", UserRole::Judge).await;
        let project = seed_submitted_project(&storage, owner, "Weights").await;

        let skewed = EvaluationPatch::parse(
            &ScoresInput {
                innovation: Some(CriterionInput {
                    score: Some(5.0),
                    weight: Some(70.0),
                }),
                technical: Some(CriterionInput {
                    score: Some(5.0),
                    weight: None,
                }),
                implementation: Some(CriterionInput {
                    score: Some(5.0),
                    weight: None,
                }),
                impact: Some(CriterionInput {
                    score: Some(5.0),
                    weight: None,
                }),
            },
            None,
            None,
        )
        .unwrap();

        let err = submit_evaluation(&storage, &scoring, judge, project.id, skewed.clone())
            .await
            .unwrap_err();
        let EvaluationError::Invalid(errors) = err else {
            panic!("expected field errors, got {err:?}");
        };
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "scores");
        assert!(errors[0].message.contains("sum to 100"));

        // 修改路径同样返回结构化错误
        let created = submit_evaluation(&storage, &scoring, judge, project.id, patch([5.0; 4]))
            .await
            .unwrap();
        let err = update_evaluation(&storage, &scoring, judge, created.evaluation.id, skewed)
            .await
            .unwrap_err();
        assert!(matches!(err, EvaluationError::Invalid(ref errors) if errors[0].field == "scores"));
    }

    #[tokio::test]
    async fn test_finalized_project_rejects_score_changes() {
        let storage = memory_storage().await;
        let scoring = ScoringConfig::default();
        let owner = seed_user(&storage, "owner", UserRole::Participant).await;
        let judge = seed_user(&storage, "judge", UserRole::Judge).await;
        let project = seed_submitted_project(&storage, owner, "Final").await;

        let created = submit_evaluation(&storage, &scoring, judge, project.id, patch([5.0; 4]))
            .await
            .unwrap();
        let finalized = storage.finalize_project(project.id).await.unwrap().unwrap();
        assert_eq!(finalized.submission_status, SubmissionStatus::Reviewed);

        let err = update_evaluation(&storage, &scoring, judge, created.evaluation.id, patch([10.0; 4]))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            EvaluationError::Failed(HackflowError::InvalidState(_))
        ));

        let score = storage.compute_project_score(project.id).await.unwrap();
        assert!(approx(score.average_score, 50.0));
        let stored = storage
            .get_evaluation_by_id(created.evaluation.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.version, 1);
        assert!(approx(stored.weighted_score, 50.0));
        assert_no_drift(&storage, project.id).await;
    }

    #[tokio::test]
    async fn test_hackathon_weights_apply_to_new_evaluations() {
        let storage = memory_storage().await;
        let scoring = ScoringConfig::default();
        let owner = seed_user(&storage, "owner", UserRole::Participant).await;
        let admin = seed_user(&storage, "admin", UserRole::Admin).await;
        let judge = seed_user(&storage, "judge", UserRole::Judge).await;
        let project = seed_submitted_project(&storage, owner, "Weighted").await;

        storage
            .update_hackathon_settings(
                crate::models::hackathon::requests::HackathonSettingsPatch {
                    judging_weights: Some(CriterionWeights {
                        innovation: 40.0,
                        technical: 20.0,
                        implementation: 20.0,
                        impact: 20.0,
                    }),
                    ..Default::default()
                },
                &scoring.default_weights,
                admin,
            )
            .await
            .unwrap();

        let outcome = submit_evaluation(&storage, &scoring, judge, project.id, patch([10.0, 5.0, 5.0, 5.0]))
            .await
            .unwrap();
        // 10*40/10 + 5*20/10*3
        assert!(approx(outcome.evaluation.weighted_score, 70.0));
        assert!(approx(outcome.evaluation.scores.innovation.weight, 40.0));
    }
}
