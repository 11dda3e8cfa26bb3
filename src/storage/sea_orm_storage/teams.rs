//! 队伍存储操作
//!
//! 队长同时作为 `leader` 角色写入成员表，`team_members.user_id` 唯一保证一人一队。

use std::collections::HashMap;

use super::SeaOrmStorage;
use crate::entity::categories::{Column as CategoryColumn, Entity as Categories};
use crate::entity::projects::{Column as ProjectColumn, Entity as Projects};
use crate::entity::team_members::{
    ActiveModel as MemberActiveModel, Column as MemberColumn, Entity as TeamMembers,
};
use crate::entity::teams::{ActiveModel, Column, Entity as Teams, Model};
use crate::entity::users::Entity as Users;
use crate::errors::{HackflowError, Result};
use crate::models::{
    projects::entities::SubmissionStatus,
    teams::{
        entities::{DEFAULT_TEAM_SIZE, Team, TeamMember, TeamRole, generate_invite_code},
        requests::{CreateTeamRequest, TeamListQuery, UpdateTeamRequest},
    },
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};

/// 邀请码冲突时的最大重新生成次数
const INVITE_CODE_ATTEMPTS: usize = 5;

fn skills_json(skills: &[String]) -> Option<String> {
    if skills.is_empty() {
        None
    } else {
        serde_json::to_string(skills).ok()
    }
}

fn already_in_team() -> HackflowError {
    HackflowError::invalid_state("You are already in a team. Leave your current team first.")
}

async fn count_members<C: ConnectionTrait>(conn: &C, team_id: i64) -> Result<i64> {
    TeamMembers::find()
        .filter(MemberColumn::TeamId.eq(team_id))
        .count(conn)
        .await
        .map(|count| count as i64)
        .map_err(|e| HackflowError::database_operation(format!("统计队伍成员失败: {e}")))
}

async fn find_membership<C: ConnectionTrait>(
    conn: &C,
    user_id: i64,
) -> Result<Option<crate::entity::team_members::Model>> {
    TeamMembers::find()
        .filter(MemberColumn::UserId.eq(user_id))
        .one(conn)
        .await
        .map_err(|e| HackflowError::database_operation(format!("查询队伍成员失败: {e}")))
}

async fn fresh_invite_code<C: ConnectionTrait>(conn: &C) -> Result<String> {
    for _ in 0..INVITE_CODE_ATTEMPTS {
        let code = generate_invite_code();
        let taken = Teams::find()
            .filter(Column::InviteCode.eq(code.as_str()))
            .one(conn)
            .await
            .map_err(|e| HackflowError::database_operation(format!("查询邀请码失败: {e}")))?
            .is_some();
        if !taken {
            return Ok(code);
        }
    }
    Err(HackflowError::conflict("Could not allocate a unique invite code"))
}

impl SeaOrmStorage {
    async fn with_member_counts(&self, models: Vec<Model>) -> Result<Vec<Team>> {
        let team_ids: Vec<i64> = models.iter().map(|m| m.id).collect();
        let counts: HashMap<i64, i64> = if team_ids.is_empty() {
            HashMap::new()
        } else {
            TeamMembers::find()
                .select_only()
                .column(MemberColumn::TeamId)
                .column_as(MemberColumn::Id.count(), "count")
                .filter(MemberColumn::TeamId.is_in(team_ids))
                .group_by(MemberColumn::TeamId)
                .into_tuple::<(i64, i64)>()
                .all(&self.db)
                .await
                .map_err(|e| HackflowError::database_operation(format!("统计队伍成员失败: {e}")))?
                .into_iter()
                .collect()
        };

        Ok(models
            .into_iter()
            .map(|m| {
                let count = counts.get(&m.id).copied().unwrap_or(0);
                m.into_team(count)
            })
            .collect())
    }

    /// 创建队伍并将创建者登记为队长
    pub async fn create_team_impl(&self, leader_id: i64, req: CreateTeamRequest) -> Result<Team> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| HackflowError::database_operation(format!("开启事务失败: {e}")))?;

        let category = Categories::find()
            .filter(CategoryColumn::Slug.eq(req.category.trim()))
            .one(&txn)
            .await
            .map_err(|e| HackflowError::database_operation(format!("查询赛道失败: {e}")))?
            .ok_or_else(|| HackflowError::not_found("Category not found"))?;
        if !category.is_active {
            return Err(HackflowError::invalid_state(
                "Category is not accepting new teams",
            ));
        }
        if let Some(limit) = category.max_teams {
            let teams = Teams::find()
                .filter(Column::Category.eq(category.slug.as_str()))
                .count(&txn)
                .await
                .map_err(|e| HackflowError::database_operation(format!("统计队伍数量失败: {e}")))?;
            if teams as i64 >= limit {
                return Err(HackflowError::invalid_state(
                    "Category has reached its team limit",
                ));
            }
        }

        if find_membership(&txn, leader_id).await?.is_some() {
            return Err(already_in_team());
        }

        let name = req.name.trim().to_string();
        let name_taken = Teams::find()
            .filter(Column::Name.eq(name.as_str()))
            .one(&txn)
            .await
            .map_err(|e| HackflowError::database_operation(format!("查询队伍失败: {e}")))?
            .is_some();
        if name_taken {
            return Err(HackflowError::conflict("Team name is already taken"));
        }

        let now = chrono::Utc::now().timestamp();
        let model = ActiveModel {
            name: Set(name),
            description: Set(req.description),
            category: Set(category.slug),
            leader_id: Set(leader_id),
            invite_code: Set(fresh_invite_code(&txn).await?),
            max_members: Set(req.max_members.unwrap_or(DEFAULT_TEAM_SIZE)),
            looking_for_members: Set(true),
            required_skills: Set(skills_json(&req.required_skills)),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let team = model.insert(&txn).await.map_err(|e| {
            if HackflowError::is_unique_violation(&e) {
                HackflowError::conflict("Team name is already taken")
            } else {
                HackflowError::database_operation(format!("创建队伍失败: {e}"))
            }
        })?;

        let leader = MemberActiveModel {
            team_id: Set(team.id),
            user_id: Set(leader_id),
            role: Set(TeamRole::LEADER.to_string()),
            joined_at: Set(now),
            ..Default::default()
        };
        leader.insert(&txn).await.map_err(|e| {
            if HackflowError::is_unique_violation(&e) {
                already_in_team()
            } else {
                HackflowError::database_operation(format!("登记队长失败: {e}"))
            }
        })?;

        txn.commit()
            .await
            .map_err(|e| HackflowError::database_operation(format!("提交事务失败: {e}")))?;

        Ok(team.into_team(1))
    }

    pub async fn get_team_by_id_impl(&self, team_id: i64) -> Result<Option<Team>> {
        let Some(model) = Teams::find_by_id(team_id)
            .one(&self.db)
            .await
            .map_err(|e| HackflowError::database_operation(format!("查询队伍失败: {e}")))?
        else {
            return Ok(None);
        };

        let count = count_members(&self.db, team_id).await?;
        Ok(Some(model.into_team(count)))
    }

    /// 用户所在的队伍
    pub async fn get_team_by_member_impl(&self, user_id: i64) -> Result<Option<Team>> {
        match find_membership(&self.db, user_id).await? {
            Some(membership) => self.get_team_by_id_impl(membership.team_id).await,
            None => Ok(None),
        }
    }

    /// 最新创建的在前
    pub async fn list_teams_impl(&self, query: TeamListQuery) -> Result<Vec<Team>> {
        let mut select = Teams::find();

        if let Some(ref category) = query.category
            && !category.trim().is_empty()
        {
            select = select.filter(Column::Category.eq(category.trim()));
        }
        if let Some(looking) = query.looking_for_members {
            select = select.filter(Column::LookingForMembers.eq(looking));
        }

        let models = select
            .order_by_desc(Column::CreatedAt)
            .order_by_desc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| HackflowError::database_operation(format!("查询队伍列表失败: {e}")))?;

        self.with_member_counts(models).await
    }

    /// 队长在前，其余按加入时间排序
    pub async fn list_team_members_impl(&self, team_id: i64) -> Result<Vec<TeamMember>> {
        let rows = TeamMembers::find()
            .filter(MemberColumn::TeamId.eq(team_id))
            .find_also_related(Users)
            .order_by_asc(MemberColumn::JoinedAt)
            .order_by_asc(MemberColumn::Id)
            .all(&self.db)
            .await
            .map_err(|e| HackflowError::database_operation(format!("查询队伍成员失败: {e}")))?;

        let mut members: Vec<TeamMember> = rows
            .into_iter()
            .filter_map(|(member, user)| user.map(|u| member.into_member(u)))
            .collect();
        members.sort_by_key(|m| m.role != TeamRole::Leader);
        Ok(members)
    }

    /// 人数上限不能低于现有人数
    pub async fn update_team_impl(
        &self,
        team_id: i64,
        update: UpdateTeamRequest,
    ) -> Result<Option<Team>> {
        let Some(existing) = self.get_team_by_id_impl(team_id).await? else {
            return Ok(None);
        };

        let mut model = ActiveModel {
            id: Set(team_id),
            updated_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        if let Some(name) = update.name {
            model.name = Set(name.trim().to_string());
        }
        if let Some(description) = update.description {
            model.description = Set(Some(description));
        }
        if let Some(max_members) = update.max_members {
            if max_members < existing.member_count {
                return Err(HackflowError::invalid_state(format!(
                    "Team already has {} members",
                    existing.member_count
                )));
            }
            model.max_members = Set(max_members);
        }
        if let Some(skills) = update.required_skills {
            model.required_skills = Set(skills_json(&skills));
        }
        if let Some(looking) = update.looking_for_members {
            model.looking_for_members = Set(looking);
        }

        let updated = model.update(&self.db).await.map_err(|e| {
            if HackflowError::is_unique_violation(&e) {
                HackflowError::conflict("Team name is already taken")
            } else {
                HackflowError::database_operation(format!("更新队伍失败: {e}"))
            }
        })?;

        Ok(Some(updated.into_team(existing.member_count)))
    }

    /// 通过邀请码加入队伍
    pub async fn join_team_impl(&self, user_id: i64, invite_code: &str) -> Result<Team> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| HackflowError::database_operation(format!("开启事务失败: {e}")))?;

        let code = invite_code.trim().to_ascii_uppercase();
        let team = Teams::find()
            .filter(Column::InviteCode.eq(code.as_str()))
            .one(&txn)
            .await
            .map_err(|e| HackflowError::database_operation(format!("查询队伍失败: {e}")))?
            .ok_or_else(|| HackflowError::not_found("Invalid invite code"))?;

        if find_membership(&txn, user_id).await?.is_some() {
            return Err(already_in_team());
        }

        if count_members(&txn, team.id).await? >= team.max_members {
            return Err(HackflowError::invalid_state("Team is already full"));
        }

        let member = MemberActiveModel {
            team_id: Set(team.id),
            user_id: Set(user_id),
            role: Set(TeamRole::MEMBER.to_string()),
            joined_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };
        member.insert(&txn).await.map_err(|e| {
            if HackflowError::is_unique_violation(&e) {
                already_in_team()
            } else {
                HackflowError::database_operation(format!("加入队伍失败: {e}"))
            }
        })?;

        // 并发加入时插入后复核人数，超员则回滚
        let member_count = count_members(&txn, team.id).await?;
        if member_count > team.max_members {
            return Err(HackflowError::invalid_state("Team is already full"));
        }

        txn.commit()
            .await
            .map_err(|e| HackflowError::database_operation(format!("提交事务失败: {e}")))?;

        Ok(team.into_team(member_count))
    }

    /// 移除队员（含主动退出），队长不能被移除
    pub async fn remove_team_member_impl(&self, team_id: i64, user_id: i64) -> Result<()> {
        let team = Teams::find_by_id(team_id)
            .one(&self.db)
            .await
            .map_err(|e| HackflowError::database_operation(format!("查询队伍失败: {e}")))?
            .ok_or_else(|| HackflowError::not_found("Team not found"))?;

        if team.leader_id == user_id {
            return Err(HackflowError::invalid_state(
                "Team leader cannot leave. Delete the team instead.",
            ));
        }

        let result = TeamMembers::delete_many()
            .filter(MemberColumn::TeamId.eq(team_id))
            .filter(MemberColumn::UserId.eq(user_id))
            .exec(&self.db)
            .await
            .map_err(|e| HackflowError::database_operation(format!("移除队员失败: {e}")))?;

        if result.rows_affected == 0 {
            return Err(HackflowError::not_found(
                "User is not a member of this team",
            ));
        }
        Ok(())
    }

    /// 解散队伍；项目已提交时拒绝
    pub async fn delete_team_impl(&self, team_id: i64) -> Result<bool> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| HackflowError::database_operation(format!("开启事务失败: {e}")))?;

        let project = Projects::find()
            .filter(ProjectColumn::TeamId.eq(team_id))
            .one(&txn)
            .await
            .map_err(|e| HackflowError::database_operation(format!("查询项目失败: {e}")))?;
        if let Some(project) = project
            && project.submission_status != SubmissionStatus::DRAFT
        {
            return Err(HackflowError::invalid_state(
                "Team has a submitted project and cannot be deleted",
            ));
        }

        // 不依赖数据库级联，显式清理
        Projects::delete_many()
            .filter(ProjectColumn::TeamId.eq(team_id))
            .exec(&txn)
            .await
            .map_err(|e| HackflowError::database_operation(format!("删除项目失败: {e}")))?;
        TeamMembers::delete_many()
            .filter(MemberColumn::TeamId.eq(team_id))
            .exec(&txn)
            .await
            .map_err(|e| HackflowError::database_operation(format!("删除队伍成员失败: {e}")))?;
        let result = Teams::delete_by_id(team_id)
            .exec(&txn)
            .await
            .map_err(|e| HackflowError::database_operation(format!("删除队伍失败: {e}")))?;

        txn.commit()
            .await
            .map_err(|e| HackflowError::database_operation(format!("提交事务失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }

    pub async fn count_teams_impl(&self) -> Result<u64> {
        Teams::find()
            .count(&self.db)
            .await
            .map_err(|e| HackflowError::database_operation(format!("统计队伍数量失败: {e}")))
    }
}
