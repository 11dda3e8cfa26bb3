//! 评审存储操作
//!
//! 评审写入与项目得分汇总在同一事务内完成：
//! - 汇总字段通过 `total_score = total_score + ?` 形式的原子表达式更新，不做读改写
//! - 评审修改使用 `version` 字段做乐观并发控制
//! - 任一步失败时事务回滚，不会留下未计入汇总的评审

use std::collections::HashMap;

use super::SeaOrmStorage;
use crate::entity::evaluations::{ActiveModel, Column, Entity as Evaluations, Model};
use crate::entity::projects::{Column as ProjectColumn, Entity as Projects};
use crate::errors::{HackflowError, Result};
use crate::models::{
    evaluations::entities::{Evaluation, EvaluationOutcome, EvaluationRecord},
    judge::responses::JudgeEvaluationItem,
    projects::entities::{ProjectScore, SubmissionStatus},
};
use sea_orm::sea_query::{Expr, ExprTrait};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};

/// 由评审内容构造 ActiveModel，其余字段由调用方补齐
fn record_model(record: &EvaluationRecord) -> ActiveModel {
    let scores = &record.scores;
    ActiveModel {
        innovation_score: Set(scores.innovation.score),
        innovation_weight: Set(scores.innovation.weight),
        technical_score: Set(scores.technical.score),
        technical_weight: Set(scores.technical.weight),
        implementation_score: Set(scores.implementation.score),
        implementation_weight: Set(scores.implementation.weight),
        impact_score: Set(scores.impact.score),
        impact_weight: Set(scores.impact.weight),
        total_score: Set(record.total_score),
        weighted_score: Set(record.weighted_score),
        strengths: Set(record.feedback.strengths.clone()),
        improvements: Set(record.feedback.improvements.clone()),
        general_comments: Set(record.feedback.general_comments.clone()),
        recommendation: Set(record.recommendation.to_string()),
        is_complete: Set(record.is_complete),
        submitted_at: Set(record.submitted_at),
        ..Default::default()
    }
}

/// 插入评审行；(project_id, judge_id) 唯一索引冲突映射为 `DuplicateEvaluation`
async fn insert_evaluation<C: ConnectionTrait>(
    conn: &C,
    project_id: i64,
    judge_id: i64,
    record: &EvaluationRecord,
    now: i64,
) -> Result<Model> {
    let model = ActiveModel {
        project_id: Set(project_id),
        judge_id: Set(judge_id),
        version: Set(1),
        created_at: Set(now),
        updated_at: Set(now),
        ..record_model(record)
    };

    model.insert(conn).await.map_err(|e| {
        if HackflowError::is_unique_violation(&e) {
            HackflowError::duplicate_evaluation("You have already evaluated this project")
        } else {
            HackflowError::database_operation(format!("创建评审失败: {e}"))
        }
    })
}

/// 读取项目状态，不存在时返回 `NotFound`
async fn load_project_status<C: ConnectionTrait>(
    conn: &C,
    project_id: i64,
) -> Result<SubmissionStatus> {
    let project = Projects::find_by_id(project_id)
        .one(conn)
        .await
        .map_err(|e| HackflowError::database_operation(format!("查询项目失败: {e}")))?
        .ok_or_else(|| HackflowError::not_found("Project not found"))?;

    Ok(project
        .submission_status
        .parse::<SubmissionStatus>()
        .unwrap_or(SubmissionStatus::Draft))
}

fn ensure_evaluable(status: SubmissionStatus) -> Result<()> {
    if status.is_evaluable() {
        Ok(())
    } else {
        Err(HackflowError::invalid_state(format!(
            "Project is not open for evaluation (status: {status})"
        )))
    }
}

impl SeaOrmStorage {
    /// 创建评审并累加项目得分
    pub async fn create_evaluation_impl(
        &self,
        project_id: i64,
        judge_id: i64,
        record: EvaluationRecord,
    ) -> Result<EvaluationOutcome> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| HackflowError::database_operation(format!("开启事务失败: {e}")))?;

        ensure_evaluable(load_project_status(&txn, project_id).await?)?;

        let existing = Evaluations::find()
            .filter(Column::ProjectId.eq(project_id))
            .filter(Column::JudgeId.eq(judge_id))
            .one(&txn)
            .await
            .map_err(|e| HackflowError::database_operation(format!("查询评审失败: {e}")))?;
        if existing.is_some() {
            return Err(HackflowError::duplicate_evaluation(
                "You have already evaluated this project",
            ));
        }

        let now = chrono::Utc::now().timestamp();
        // 并发重复提交由唯一索引兜底
        let inserted = insert_evaluation(&txn, project_id, judge_id, &record, now).await?;

        apply_score_delta(&txn, project_id, inserted.weighted_score, 1, now).await?;

        // 首次评审时 submitted -> under_review，其它状态不回退
        Projects::update_many()
            .col_expr(
                ProjectColumn::SubmissionStatus,
                Expr::value(SubmissionStatus::UNDER_REVIEW),
            )
            .filter(ProjectColumn::Id.eq(project_id))
            .filter(ProjectColumn::SubmissionStatus.eq(SubmissionStatus::SUBMITTED))
            .exec(&txn)
            .await
            .map_err(|e| HackflowError::database_operation(format!("更新项目状态失败: {e}")))?;

        let project_score = load_project_score(&txn, project_id).await?;

        txn.commit()
            .await
            .map_err(|e| HackflowError::database_operation(format!("提交事务失败: {e}")))?;

        Ok(EvaluationOutcome {
            evaluation: inserted.into_evaluation(),
            project_score,
        })
    }

    /// 修改评审，按 weighted_score 差值调整项目得分
    ///
    /// `expected_version` 与库中版本不一致时返回 `Conflict`，由调用方重读后重试。
    pub async fn update_evaluation_impl(
        &self,
        evaluation_id: i64,
        expected_version: i64,
        record: EvaluationRecord,
    ) -> Result<EvaluationOutcome> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| HackflowError::database_operation(format!("开启事务失败: {e}")))?;

        let current = Evaluations::find_by_id(evaluation_id)
            .one(&txn)
            .await
            .map_err(|e| HackflowError::database_operation(format!("查询评审失败: {e}")))?
            .ok_or_else(|| HackflowError::not_found("Evaluation not found"))?;

        if current.version != expected_version {
            return Err(HackflowError::conflict(format!(
                "Evaluation {evaluation_id} was modified concurrently (expected version {expected_version}, found {})",
                current.version
            )));
        }

        // 定稿或撤回后的项目不再接受改分
        ensure_evaluable(load_project_status(&txn, current.project_id).await?)?;

        let now = chrono::Utc::now().timestamp();
        let model = ActiveModel {
            version: Set(expected_version + 1),
            updated_at: Set(now),
            ..record_model(&record)
        };

        let result = Evaluations::update_many()
            .set(model)
            .filter(Column::Id.eq(evaluation_id))
            .filter(Column::Version.eq(expected_version))
            .exec(&txn)
            .await
            .map_err(|e| HackflowError::database_operation(format!("更新评审失败: {e}")))?;

        if result.rows_affected == 0 {
            return Err(HackflowError::conflict(format!(
                "Evaluation {evaluation_id} was modified concurrently"
            )));
        }

        let updated = Evaluations::find_by_id(evaluation_id)
            .one(&txn)
            .await
            .map_err(|e| HackflowError::database_operation(format!("查询评审失败: {e}")))?
            .ok_or_else(|| HackflowError::not_found("Evaluation not found"))?;

        let delta = updated.weighted_score - current.weighted_score;
        apply_score_delta(&txn, current.project_id, delta, 0, now).await?;

        let project_score = load_project_score(&txn, current.project_id).await?;

        txn.commit()
            .await
            .map_err(|e| HackflowError::database_operation(format!("提交事务失败: {e}")))?;

        Ok(EvaluationOutcome {
            evaluation: updated.into_evaluation(),
            project_score,
        })
    }

    /// 通过 ID 获取评审
    pub async fn get_evaluation_by_id_impl(&self, evaluation_id: i64) -> Result<Option<Evaluation>> {
        let result = Evaluations::find_by_id(evaluation_id)
            .one(&self.db)
            .await
            .map_err(|e| HackflowError::database_operation(format!("查询评审失败: {e}")))?;

        Ok(result.map(|m| m.into_evaluation()))
    }

    /// 获取某评委对某项目的评审
    pub async fn get_evaluation_by_project_and_judge_impl(
        &self,
        project_id: i64,
        judge_id: i64,
    ) -> Result<Option<Evaluation>> {
        let result = Evaluations::find()
            .filter(Column::ProjectId.eq(project_id))
            .filter(Column::JudgeId.eq(judge_id))
            .one(&self.db)
            .await
            .map_err(|e| HackflowError::database_operation(format!("查询评审失败: {e}")))?;

        Ok(result.map(|m| m.into_evaluation()))
    }

    /// 列出项目的全部评审
    pub async fn list_evaluations_by_project_impl(
        &self,
        project_id: i64,
    ) -> Result<Vec<Evaluation>> {
        let models = Evaluations::find()
            .filter(Column::ProjectId.eq(project_id))
            .order_by_asc(Column::CreatedAt)
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| HackflowError::database_operation(format!("查询评审列表失败: {e}")))?;

        Ok(models.into_iter().map(Model::into_evaluation).collect())
    }

    /// 列出评委的评审（最新在前），附带项目标题
    pub async fn list_evaluations_by_judge_impl(
        &self,
        judge_id: i64,
    ) -> Result<Vec<JudgeEvaluationItem>> {
        let models = Evaluations::find()
            .filter(Column::JudgeId.eq(judge_id))
            .order_by_desc(Column::CreatedAt)
            .order_by_desc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| HackflowError::database_operation(format!("查询评审列表失败: {e}")))?;

        let project_ids: Vec<i64> = models.iter().map(|m| m.project_id).collect();
        let projects: HashMap<i64, (String, String)> = if project_ids.is_empty() {
            HashMap::new()
        } else {
            Projects::find()
                .filter(ProjectColumn::Id.is_in(project_ids))
                .all(&self.db)
                .await
                .map_err(|e| HackflowError::database_operation(format!("查询项目失败: {e}")))?
                .into_iter()
                .map(|p| (p.id, (p.title, p.category)))
                .collect()
        };

        Ok(models
            .into_iter()
            .map(|m| {
                let (project_title, project_category) =
                    projects.get(&m.project_id).cloned().unwrap_or_default();
                JudgeEvaluationItem {
                    evaluation: m.into_evaluation(),
                    project_title,
                    project_category,
                }
            })
            .collect())
    }

    /// 全量评审（导出用），按 ID 升序
    pub async fn list_evaluations_for_export_impl(&self, limit: u64) -> Result<Vec<Evaluation>> {
        let models = Evaluations::find()
            .order_by_asc(Column::Id)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(|e| HackflowError::database_operation(format!("导出评审失败: {e}")))?;

        Ok(models.into_iter().map(Model::into_evaluation).collect())
    }

    /// 统计评委已完成的评审数
    pub async fn count_evaluations_by_judge_impl(&self, judge_id: i64) -> Result<u64> {
        Evaluations::find()
            .filter(Column::JudgeId.eq(judge_id))
            .count(&self.db)
            .await
            .map_err(|e| HackflowError::database_operation(format!("统计评审数量失败: {e}")))
    }

    /// 统计评审总数
    pub async fn count_evaluations_impl(&self, complete_only: bool) -> Result<u64> {
        let mut select = Evaluations::find();
        if complete_only {
            select = select.filter(Column::IsComplete.eq(true));
        }
        select
            .count(&self.db)
            .await
            .map_err(|e| HackflowError::database_operation(format!("统计评审数量失败: {e}")))
    }

    /// 根据评审记录计算项目得分（只读，不写回）
    pub async fn compute_project_score_impl(&self, project_id: i64) -> Result<ProjectScore> {
        let project = Projects::find_by_id(project_id)
            .one(&self.db)
            .await
            .map_err(|e| HackflowError::database_operation(format!("查询项目失败: {e}")))?
            .ok_or_else(|| HackflowError::not_found("Project not found"))?;

        let (total_score, evaluation_count) = sum_weighted_scores(&self.db, project_id).await?;

        Ok(ProjectScore {
            project_id,
            total_score,
            average_score: average_of(total_score, evaluation_count),
            evaluation_count,
            submission_status: project
                .submission_status
                .parse::<SubmissionStatus>()
                .unwrap_or(SubmissionStatus::Draft),
        })
    }

    /// 从评审记录重建项目得分，返回 (重建前, 重建后)
    pub async fn recalculate_project_score_impl(
        &self,
        project_id: i64,
    ) -> Result<(ProjectScore, ProjectScore)> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| HackflowError::database_operation(format!("开启事务失败: {e}")))?;

        let previous = load_project_score(&txn, project_id).await?;
        let (total_score, evaluation_count) = sum_weighted_scores(&txn, project_id).await?;

        Projects::update_many()
            .col_expr(ProjectColumn::TotalScore, Expr::value(total_score))
            .col_expr(ProjectColumn::EvaluationCount, Expr::value(evaluation_count))
            .col_expr(
                ProjectColumn::AverageScore,
                Expr::value(average_of(total_score, evaluation_count)),
            )
            .col_expr(
                ProjectColumn::UpdatedAt,
                Expr::value(chrono::Utc::now().timestamp()),
            )
            .filter(ProjectColumn::Id.eq(project_id))
            .exec(&txn)
            .await
            .map_err(|e| HackflowError::database_operation(format!("重算项目得分失败: {e}")))?;

        let current = load_project_score(&txn, project_id).await?;

        txn.commit()
            .await
            .map_err(|e| HackflowError::database_operation(format!("提交事务失败: {e}")))?;

        Ok((previous, current))
    }
}

fn average_of(total_score: f64, evaluation_count: i64) -> f64 {
    if evaluation_count > 0 {
        total_score / evaluation_count as f64
    } else {
        0.0
    }
}

/// 原子地累加项目得分与评审数，并在同一事务内重算平均分
async fn apply_score_delta<C: ConnectionTrait>(
    conn: &C,
    project_id: i64,
    score_delta: f64,
    count_delta: i64,
    now: i64,
) -> Result<()> {
    let result = Projects::update_many()
        .col_expr(
            ProjectColumn::TotalScore,
            Expr::col(ProjectColumn::TotalScore).add(score_delta),
        )
        .col_expr(
            ProjectColumn::EvaluationCount,
            Expr::col(ProjectColumn::EvaluationCount).add(count_delta),
        )
        .col_expr(ProjectColumn::UpdatedAt, Expr::value(now))
        .filter(ProjectColumn::Id.eq(project_id))
        .exec(conn)
        .await
        .map_err(|e| HackflowError::database_operation(format!("更新项目得分失败: {e}")))?;

    if result.rows_affected == 0 {
        // MySQL 在值未变化时也返回 0，需再确认项目是否存在
        let exists = Projects::find_by_id(project_id)
            .one(conn)
            .await
            .map_err(|e| HackflowError::database_operation(format!("查询项目失败: {e}")))?
            .is_some();
        if !exists {
            return Err(HackflowError::not_found("Project not found"));
        }
    }

    Projects::update_many()
        .col_expr(
            ProjectColumn::AverageScore,
            Expr::col(ProjectColumn::TotalScore).div(Expr::col(ProjectColumn::EvaluationCount)),
        )
        .filter(ProjectColumn::Id.eq(project_id))
        .filter(ProjectColumn::EvaluationCount.gt(0))
        .exec(conn)
        .await
        .map_err(|e| HackflowError::database_operation(format!("更新项目平均分失败: {e}")))?;

    Ok(())
}

async fn load_project_score<C: ConnectionTrait>(conn: &C, project_id: i64) -> Result<ProjectScore> {
    Projects::find_by_id(project_id)
        .one(conn)
        .await
        .map_err(|e| HackflowError::database_operation(format!("查询项目失败: {e}")))?
        .map(|p| p.into_score())
        .ok_or_else(|| HackflowError::not_found("Project not found"))
}

/// 返回 (weighted_score 之和, 评审数)
async fn sum_weighted_scores<C: ConnectionTrait>(conn: &C, project_id: i64) -> Result<(f64, i64)> {
    let scores: Vec<f64> = Evaluations::find()
        .select_only()
        .column(Column::WeightedScore)
        .filter(Column::ProjectId.eq(project_id))
        .into_tuple()
        .all(conn)
        .await
        .map_err(|e| HackflowError::database_operation(format!("查询评审得分失败: {e}")))?;

    Ok((scores.iter().sum(), scores.len() as i64))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::config::{CriterionWeights, DatabaseConfig};
    use crate::models::evaluations::requests::{CriterionInput, ScoresInput};
    use crate::models::users::entities::UserRole;
    use crate::services::evaluations::scoring::EvaluationPatch;
    use crate::storage::Storage;
    use crate::storage::sea_orm_storage::testing::{seed_submitted_project, seed_user};

    fn record(score: f64) -> EvaluationRecord {
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
        .into_new_record(&CriterionWeights::default(), chrono::Utc::now().timestamp())
        .unwrap()
    }

    async fn connect(url: &str, pool_size: u32) -> Arc<SeaOrmStorage> {
        let config = DatabaseConfig {
            url: url.to_string(),
            pool_size,
            timeout: 5,
        };
        Arc::new(SeaOrmStorage::connect(&config).await.unwrap())
    }

    async fn assert_single_evaluation(storage: &Arc<dyn Storage>, project_id: i64, judge_id: i64) {
        let rows = storage.list_evaluations_by_project(project_id).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].judge_id, judge_id);

        let stored = storage
            .get_project_by_id(project_id)
            .await
            .unwrap()
            .unwrap()
            .score();
        let recomputed = storage.compute_project_score(project_id).await.unwrap();
        assert!(stored.matches(&recomputed));
        assert_eq!(stored.evaluation_count, 1);
    }

    #[tokio::test]
    async fn test_insert_behind_passed_precheck_is_duplicate() {
        let concrete = connect(":memory:", 1).await;
        let storage: Arc<dyn Storage> = concrete.clone();
        let owner = seed_user(&storage, "owner", UserRole::Participant).await;
        let judge = seed_user(&storage, "judge", UserRole::Judge).await;
        let project = seed_submitted_project(&storage, owner, "Twice").await;

        storage
            .create_evaluation(project.id, judge, record(6.0))
            .await
            .unwrap();

        // 另一请求已通过存在性检查，随后才写入
        let err = insert_evaluation(
            &concrete.db,
            project.id,
            judge,
            &record(9.0),
            chrono::Utc::now().timestamp(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, HackflowError::DuplicateEvaluation(_)));

        assert_single_evaluation(&storage, project.id, judge).await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_racing_submissions_store_one_evaluation() {
        let path = std::env::temp_dir().join(format!("hackflow-race-{}.db", uuid::Uuid::new_v4()));
        let url = path.to_string_lossy().to_string();
        let storage: Arc<dyn Storage> = connect(&url, 4).await;

        let owner = seed_user(&storage, "owner", UserRole::Participant).await;
        let judge = seed_user(&storage, "judge", UserRole::Judge).await;
        let project = seed_submitted_project(&storage, owner, "Contested").await;

        let barrier = Arc::new(tokio::sync::Barrier::new(8));
        let attempts = (0..8).map(|idx| {
            let storage = storage.clone();
            let barrier = barrier.clone();
            let project_id = project.id;
            tokio::spawn(async move {
                barrier.wait().await;
                storage
                    .create_evaluation(project_id, judge, record(idx as f64))
                    .await
            })
        });

        let mut accepted = 0;
        for result in futures_util::future::join_all(attempts).await {
            match result.expect("task should not panic") {
                Ok(_) => accepted += 1,
                // 写锁竞争失败的事务整体回滚
                Err(HackflowError::DuplicateEvaluation(_) | HackflowError::DatabaseOperation(_)) => {}
                Err(other) => panic!("unexpected error: {other:?}"),
            }
        }
        assert_eq!(accepted, 1);
        assert_single_evaluation(&storage, project.id, judge).await;

        drop(storage);
        for suffix in ["", "-wal", "-shm"] {
            let _ = std::fs::remove_file(format!("{url}{suffix}"));
        }
    }
}
