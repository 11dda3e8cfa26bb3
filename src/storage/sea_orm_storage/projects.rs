//! 参赛项目存储操作

use std::collections::HashMap;

use super::SeaOrmStorage;
use crate::entity::evaluations::{Column as EvaluationColumn, Entity as Evaluations};
use crate::entity::projects::{ActiveModel, Column, Entity as Projects};
use crate::entity::teams::{Column as TeamColumn, Entity as Teams};
use crate::errors::{HackflowError, Result};
use crate::models::{
    PaginationInfo,
    admin::responses::LabelCount,
    judge::{requests::JudgeProjectQuery, responses::JudgeProjectItem},
    projects::{
        entities::{Project, SubmissionStatus},
        requests::{CreateProjectRequest, ProjectListQuery, UpdateProjectRequest},
        responses::{LeaderboardEntry, ProjectListResponse},
    },
};
use crate::utils::escape_like_pattern;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};

fn technologies_json(technologies: &[String]) -> Option<String> {
    if technologies.is_empty() {
        None
    } else {
        serde_json::to_string(technologies).ok()
    }
}

fn status_strings(statuses: &[SubmissionStatus]) -> Vec<String> {
    statuses.iter().map(|s| s.to_string()).collect()
}

impl SeaOrmStorage {
    /// 为队伍创建项目（每队一个），赛道沿用队伍赛道
    pub async fn create_project_impl(
        &self,
        team_id: i64,
        created_by: i64,
        req: CreateProjectRequest,
    ) -> Result<Project> {
        let team = Teams::find_by_id(team_id)
            .one(&self.db)
            .await
            .map_err(|e| HackflowError::database_operation(format!("查询队伍失败: {e}")))?
            .ok_or_else(|| HackflowError::not_found("Team not found"))?;

        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            team_id: Set(team_id),
            created_by: Set(Some(created_by)),
            title: Set(req.title),
            tagline: Set(req.tagline),
            description: Set(req.description),
            category: Set(team.category),
            technologies: Set(technologies_json(&req.technologies)),
            demo_url: Set(req.demo_url),
            video_url: Set(req.video_url),
            github_url: Set(req.github_url),
            submission_status: Set(SubmissionStatus::DRAFT.to_string()),
            submitted_at: Set(None),
            total_score: Set(0.0),
            average_score: Set(0.0),
            evaluation_count: Set(0),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model.insert(&self.db).await.map_err(|e| {
            if HackflowError::is_unique_violation(&e) {
                HackflowError::conflict("Your team already has a project")
            } else {
                HackflowError::database_operation(format!("创建项目失败: {e}"))
            }
        })?;

        Ok(result.into_project())
    }

    /// 通过 ID 获取项目
    pub async fn get_project_by_id_impl(&self, project_id: i64) -> Result<Option<Project>> {
        let result = Projects::find_by_id(project_id)
            .one(&self.db)
            .await
            .map_err(|e| HackflowError::database_operation(format!("查询项目失败: {e}")))?;

        Ok(result.map(|m| m.into_project()))
    }

    /// 获取队伍的项目
    pub async fn get_project_by_team_impl(&self, team_id: i64) -> Result<Option<Project>> {
        let result = Projects::find()
            .filter(Column::TeamId.eq(team_id))
            .one(&self.db)
            .await
            .map_err(|e| HackflowError::database_operation(format!("查询项目失败: {e}")))?;

        Ok(result.map(|m| m.into_project()))
    }

    /// 更新项目信息
    pub async fn update_project_impl(
        &self,
        project_id: i64,
        update: UpdateProjectRequest,
    ) -> Result<Option<Project>> {
        let existing = Projects::find_by_id(project_id)
            .one(&self.db)
            .await
            .map_err(|e| HackflowError::database_operation(format!("查询项目失败: {e}")))?;
        if existing.is_none() {
            return Ok(None);
        }

        let mut model = ActiveModel {
            id: Set(project_id),
            updated_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        if let Some(title) = update.title {
            model.title = Set(title);
        }
        if let Some(tagline) = update.tagline {
            model.tagline = Set(Some(tagline));
        }
        if let Some(description) = update.description {
            model.description = Set(description);
        }
        if let Some(technologies) = update.technologies {
            model.technologies = Set(technologies_json(&technologies));
        }
        if let Some(demo_url) = update.demo_url {
            model.demo_url = Set(Some(demo_url));
        }
        if let Some(video_url) = update.video_url {
            model.video_url = Set(Some(video_url));
        }
        if let Some(github_url) = update.github_url {
            model.github_url = Set(Some(github_url));
        }

        let result = model
            .update(&self.db)
            .await
            .map_err(|e| HackflowError::database_operation(format!("更新项目失败: {e}")))?;

        Ok(Some(result.into_project()))
    }

    /// 状态迁移：仅当当前状态为 `from` 时改为 `to`
    ///
    /// 项目不存在返回 `Ok(None)`，状态不符返回 `InvalidState`。
    async fn transition_project_status(
        &self,
        project_id: i64,
        from: SubmissionStatus,
        to: SubmissionStatus,
        stamp_submitted_at: bool,
    ) -> Result<Option<Project>> {
        let now = chrono::Utc::now().timestamp();

        let mut update = Projects::update_many()
            .col_expr(Column::SubmissionStatus, Expr::value(to.to_string()))
            .col_expr(Column::UpdatedAt, Expr::value(now));
        if stamp_submitted_at {
            update = update.col_expr(Column::SubmittedAt, Expr::value(now));
        }

        let result = update
            .filter(Column::Id.eq(project_id))
            .filter(Column::SubmissionStatus.eq(from.to_string()))
            .exec(&self.db)
            .await
            .map_err(|e| HackflowError::database_operation(format!("更新项目状态失败: {e}")))?;

        let project = self.get_project_by_id_impl(project_id).await?;

        match project {
            None => Ok(None),
            Some(project) if result.rows_affected == 0 => {
                Err(HackflowError::invalid_state(format!(
                    "Project status is {}, expected {from}",
                    project.submission_status
                )))
            }
            Some(project) => Ok(Some(project)),
        }
    }

    /// 提交项目：draft -> submitted
    pub async fn submit_project_impl(&self, project_id: i64) -> Result<Option<Project>> {
        self.transition_project_status(
            project_id,
            SubmissionStatus::Draft,
            SubmissionStatus::Submitted,
            true,
        )
        .await
    }

    /// 结束评审：under_review -> reviewed
    pub async fn finalize_project_impl(&self, project_id: i64) -> Result<Option<Project>> {
        self.transition_project_status(
            project_id,
            SubmissionStatus::UnderReview,
            SubmissionStatus::Reviewed,
            false,
        )
        .await
    }

    /// 删除项目（评审与附件级联删除）
    pub async fn delete_project_impl(&self, project_id: i64) -> Result<bool> {
        let result = Projects::delete_by_id(project_id)
            .exec(&self.db)
            .await
            .map_err(|e| HackflowError::database_operation(format!("删除项目失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }

    /// 分页列出项目，按平均分降序、提交时间降序
    pub async fn list_projects_with_pagination_impl(
        &self,
        query: ProjectListQuery,
    ) -> Result<ProjectListResponse> {
        let page = query.page.unwrap_or(1).max(1) as u64;
        let size = query.size.unwrap_or(10).clamp(1, 100) as u64;

        let mut select = Projects::find();

        if !query.statuses.is_empty() {
            select = select.filter(Column::SubmissionStatus.is_in(status_strings(&query.statuses)));
        }

        if let Some(ref category) = query.category
            && !category.trim().is_empty()
        {
            select = select.filter(Column::Category.eq(category.trim()));
        }

        if let Some(ref search) = query.search
            && !search.trim().is_empty()
        {
            let escaped = escape_like_pattern(search.trim());
            select = select.filter(
                Condition::any()
                    .add(Column::Title.contains(&escaped))
                    .add(Column::Tagline.contains(&escaped))
                    .add(Column::Description.contains(&escaped)),
            );
        }

        select = select
            .order_by_desc(Column::AverageScore)
            .order_by_desc(Column::SubmittedAt)
            .order_by_desc(Column::Id);

        let paginator = select.paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| HackflowError::database_operation(format!("查询项目总数失败: {e}")))?;

        let pages = paginator
            .num_pages()
            .await
            .map_err(|e| HackflowError::database_operation(format!("查询项目页数失败: {e}")))?;

        let projects = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| HackflowError::database_operation(format!("查询项目列表失败: {e}")))?;

        Ok(ProjectListResponse {
            items: projects.into_iter().map(|m| m.into_project()).collect(),
            pagination: PaginationInfo::new(page, size, total, pages),
        })
    }

    /// 排行榜：评审中与已结束评审的项目，按平均分降序
    pub async fn list_leaderboard_impl(&self, limit: u64) -> Result<Vec<LeaderboardEntry>> {
        let projects = Projects::find()
            .filter(Column::SubmissionStatus.is_in(status_strings(SubmissionStatus::ranked())))
            .order_by_desc(Column::AverageScore)
            .order_by_desc(Column::EvaluationCount)
            .order_by_asc(Column::SubmittedAt)
            .order_by_asc(Column::Id)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(|e| HackflowError::database_operation(format!("查询排行榜失败: {e}")))?;

        let team_ids: Vec<i64> = projects.iter().map(|p| p.team_id).collect();
        let team_names: HashMap<i64, String> = if team_ids.is_empty() {
            HashMap::new()
        } else {
            Teams::find()
                .select_only()
                .column(TeamColumn::Id)
                .column(TeamColumn::Name)
                .filter(TeamColumn::Id.is_in(team_ids))
                .into_tuple::<(i64, String)>()
                .all(&self.db)
                .await
                .map_err(|e| HackflowError::database_operation(format!("查询队伍失败: {e}")))?
                .into_iter()
                .collect()
        };

        Ok(projects
            .into_iter()
            .enumerate()
            .map(|(idx, p)| LeaderboardEntry {
                rank: idx as u64 + 1,
                project_id: p.id,
                team_name: team_names.get(&p.team_id).cloned().unwrap_or_default(),
                title: p.title,
                category: p.category,
                average_score: p.average_score,
                evaluation_count: p.evaluation_count,
            })
            .collect())
    }

    /// 评委可评审的项目，附带该评委自己的评审
    pub async fn list_judgeable_projects_impl(
        &self,
        judge_id: i64,
        query: JudgeProjectQuery,
    ) -> Result<Vec<JudgeProjectItem>> {
        let mut select = Projects::find()
            .filter(Column::SubmissionStatus.is_in(status_strings(SubmissionStatus::evaluable())));

        if let Some(ref category) = query.category
            && !category.trim().is_empty()
        {
            select = select.filter(Column::Category.eq(category.trim()));
        }

        let projects = select
            .order_by_asc(Column::SubmittedAt)
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| HackflowError::database_operation(format!("查询待评项目失败: {e}")))?;

        let project_ids: Vec<i64> = projects.iter().map(|p| p.id).collect();
        let mut mine: HashMap<i64, _> = if project_ids.is_empty() {
            HashMap::new()
        } else {
            Evaluations::find()
                .filter(EvaluationColumn::JudgeId.eq(judge_id))
                .filter(EvaluationColumn::ProjectId.is_in(project_ids))
                .all(&self.db)
                .await
                .map_err(|e| HackflowError::database_operation(format!("查询评审失败: {e}")))?
                .into_iter()
                .map(|e| (e.project_id, e.into_evaluation()))
                .collect()
        };

        Ok(projects
            .into_iter()
            .map(|p| {
                let my_evaluation = mine.remove(&p.id);
                JudgeProjectItem {
                    project: p.into_project(),
                    my_evaluation,
                }
            })
            .filter(|item| match query.evaluated {
                Some(true) => item.my_evaluation.is_some(),
                Some(false) => item.my_evaluation.is_none(),
                None => true,
            })
            .collect())
    }

    /// 全量项目（导出用），按 ID 升序
    pub async fn list_projects_for_export_impl(&self, limit: u64) -> Result<Vec<Project>> {
        let projects = Projects::find()
            .order_by_asc(Column::Id)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(|e| HackflowError::database_operation(format!("导出项目失败: {e}")))?;

        Ok(projects.into_iter().map(|m| m.into_project()).collect())
    }

    /// 统计处于指定状态的项目数
    pub async fn count_projects_in_statuses_impl(
        &self,
        statuses: &[SubmissionStatus],
    ) -> Result<u64> {
        Projects::find()
            .filter(Column::SubmissionStatus.is_in(status_strings(statuses)))
            .count(&self.db)
            .await
            .map_err(|e| HackflowError::database_operation(format!("统计项目数量失败: {e}")))
    }

    /// 按状态分组统计项目数量
    pub async fn count_projects_by_status_impl(&self) -> Result<Vec<LabelCount>> {
        let rows: Vec<(String, i64)> = Projects::find()
            .select_only()
            .column(Column::SubmissionStatus)
            .column_as(Column::Id.count(), "count")
            .group_by(Column::SubmissionStatus)
            .order_by_asc(Column::SubmissionStatus)
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(|e| HackflowError::database_operation(format!("统计项目状态失败: {e}")))?;

        Ok(rows
            .into_iter()
            .map(|(label, count)| LabelCount { label, count })
            .collect())
    }
}
