//! 用户存储操作

use super::SeaOrmStorage;
use crate::entity::evaluations::{Column as EvaluationColumn, Entity as Evaluations};
use crate::entity::team_members::{Column as MemberColumn, Entity as TeamMembers};
use crate::entity::teams::{Column as TeamColumn, Entity as Teams};
use crate::entity::users::{ActiveModel, Column, Entity as Users};
use crate::errors::{HackflowError, Result};
use crate::models::{
    PaginationInfo,
    admin::responses::LabelCount,
    users::{
        entities::{User, UserStatus},
        requests::{CreateUserRequest, UpdateUserRequest, UserListQuery},
        responses::UserListResponse,
    },
};
use crate::utils::escape_like_pattern;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};

impl SeaOrmStorage {
    async fn find_user(&self, condition: Condition) -> Result<Option<User>> {
        Users::find()
            .filter(condition)
            .one(&self.db)
            .await
            .map(|model| model.map(|m| m.into_user()))
            .map_err(|e| HackflowError::database_operation(format!("查询用户失败: {e}")))
    }

    /// 新用户总是启用状态；用户名或邮箱冲突返回 `Conflict`
    pub async fn create_user_impl(&self, req: CreateUserRequest) -> Result<User> {
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            username: Set(req.username),
            email: Set(req.email),
            password_hash: Set(req.password),
            role: Set(req.role.to_string()),
            status: Set(UserStatus::Active.to_string()),
            display_name: Set(req.display_name),
            avatar_url: Set(req.avatar_url),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        match model.insert(&self.db).await {
            Ok(created) => Ok(created.into_user()),
            Err(e) if HackflowError::is_unique_violation(&e) => Err(HackflowError::conflict(
                "Username or email already registered",
            )),
            Err(e) => Err(HackflowError::database_operation(format!("创建用户失败: {e}"))),
        }
    }

    pub async fn get_user_by_id_impl(&self, id: i64) -> Result<Option<User>> {
        self.find_user(Condition::all().add(Column::Id.eq(id))).await
    }

    pub async fn get_user_by_username_impl(&self, username: &str) -> Result<Option<User>> {
        self.find_user(Condition::all().add(Column::Username.eq(username)))
            .await
    }

    pub async fn get_user_by_email_impl(&self, email: &str) -> Result<Option<User>> {
        self.find_user(Condition::all().add(Column::Email.eq(email)))
            .await
    }

    /// 登录时用户名与邮箱均可
    pub async fn get_user_by_username_or_email_impl(
        &self,
        identifier: &str,
    ) -> Result<Option<User>> {
        self.find_user(
            Condition::any()
                .add(Column::Username.eq(identifier))
                .add(Column::Email.eq(identifier)),
        )
        .await
    }

    /// 分页列出用户
    pub async fn list_users_with_pagination_impl(
        &self,
        query: UserListQuery,
    ) -> Result<UserListResponse> {
        let page = query.page.unwrap_or(1).max(1) as u64;
        let size = query.size.unwrap_or(10).clamp(1, 100) as u64;

        let mut select = Users::find();

        if let Some(ref search) = query.search
            && !search.trim().is_empty()
        {
            let escaped = escape_like_pattern(search.trim());
            select = select.filter(
                Condition::any()
                    .add(Column::Username.contains(&escaped))
                    .add(Column::Email.contains(&escaped))
                    .add(Column::DisplayName.contains(&escaped)),
            );
        }

        if let Some(ref role) = query.role {
            select = select.filter(Column::Role.eq(role.to_string()));
        }

        if let Some(ref status) = query.status {
            select = select.filter(Column::Status.eq(status.to_string()));
        }

        let paginator = select
            .order_by_desc(Column::CreatedAt)
            .paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| HackflowError::database_operation(format!("查询用户总数失败: {e}")))?;

        let pages = paginator
            .num_pages()
            .await
            .map_err(|e| HackflowError::database_operation(format!("查询用户页数失败: {e}")))?;

        let users = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| HackflowError::database_operation(format!("查询用户列表失败: {e}")))?;

        Ok(UserListResponse {
            items: users.into_iter().map(|m| m.into_user()).collect(),
            pagination: PaginationInfo::new(page, size, total, pages),
        })
    }

    pub async fn update_last_login_impl(&self, id: i64) -> Result<bool> {
        let now = chrono::Utc::now().timestamp();

        let result = Users::update_many()
            .col_expr(Column::LastLogin, sea_orm::sea_query::Expr::value(now))
            .filter(Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(|e| HackflowError::database_operation(format!("更新最后登录时间失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }

    /// 仅写入请求中给出的字段
    pub async fn update_user_impl(
        &self,
        id: i64,
        update: UpdateUserRequest,
    ) -> Result<Option<User>> {
        if self.get_user_by_id_impl(id).await?.is_none() {
            return Ok(None);
        }

        let now = chrono::Utc::now().timestamp();

        let mut model = ActiveModel {
            id: Set(id),
            updated_at: Set(now),
            ..Default::default()
        };

        if let Some(email) = update.email {
            model.email = Set(email);
        }

        if let Some(password) = update.password {
            model.password_hash = Set(password);
        }

        if let Some(role) = update.role {
            model.role = Set(role.to_string());
        }

        if let Some(status) = update.status {
            model.status = Set(status.to_string());
        }

        if let Some(display_name) = update.display_name {
            model.display_name = Set(Some(display_name));
        }

        if let Some(avatar_url) = update.avatar_url {
            model.avatar_url = Set(Some(avatar_url));
        }

        model
            .update(&self.db)
            .await
            .map_err(|e| HackflowError::database_operation(format!("更新用户失败: {e}")))?;

        self.get_user_by_id_impl(id).await
    }

    pub async fn count_users_impl(&self) -> Result<u64> {
        let count = Users::find()
            .count(&self.db)
            .await
            .map_err(|e| HackflowError::database_operation(format!("统计用户数量失败: {e}")))?;

        Ok(count)
    }

    /// 按角色分组计数，供管理看板使用
    pub async fn count_users_by_role_impl(&self) -> Result<Vec<LabelCount>> {
        let rows: Vec<(String, i64)> = Users::find()
            .select_only()
            .column(Column::Role)
            .column_as(Column::Id.count(), "count")
            .group_by(Column::Role)
            .order_by_asc(Column::Role)
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(|e| HackflowError::database_operation(format!("统计用户角色失败: {e}")))?;

        Ok(rows
            .into_iter()
            .map(|(label, count)| LabelCount { label, count })
            .collect())
    }

    /// 按用户名、邮箱或昵称搜索启用状态的用户
    pub async fn search_users_impl(&self, keyword: &str, limit: u64) -> Result<Vec<User>> {
        let escaped = escape_like_pattern(keyword.trim());
        let users = Users::find()
            .filter(Column::Status.eq(UserStatus::Active.to_string()))
            .filter(
                Condition::any()
                    .add(Column::Username.contains(&escaped))
                    .add(Column::Email.contains(&escaped))
                    .add(Column::DisplayName.contains(&escaped)),
            )
            .order_by_asc(Column::Username)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(|e| HackflowError::database_operation(format!("搜索用户失败: {e}")))?;

        Ok(users.into_iter().map(|m| m.into_user()).collect())
    }

    /// 全量用户（导出用），按 ID 升序
    pub async fn list_users_for_export_impl(&self, limit: u64) -> Result<Vec<User>> {
        let users = Users::find()
            .order_by_asc(Column::Id)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(|e| HackflowError::database_operation(format!("导出用户失败: {e}")))?;

        Ok(users.into_iter().map(|m| m.into_user()).collect())
    }

    /// 注销账号；队长需先解散队伍
    pub async fn delete_user_impl(&self, user_id: i64) -> Result<bool> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| HackflowError::database_operation(format!("开启事务失败: {e}")))?;

        let leads_team = Teams::find()
            .filter(TeamColumn::LeaderId.eq(user_id))
            .one(&txn)
            .await
            .map_err(|e| HackflowError::database_operation(format!("查询队伍失败: {e}")))?
            .is_some();
        if leads_team {
            return Err(HackflowError::invalid_state(
                "Cannot delete account while leading a team. Delete the team first.",
            ));
        }

        // 级联删除评审会使项目汇总失真
        let evaluations = Evaluations::find()
            .filter(EvaluationColumn::JudgeId.eq(user_id))
            .count(&txn)
            .await
            .map_err(|e| HackflowError::database_operation(format!("统计评审数量失败: {e}")))?;
        if evaluations > 0 {
            return Err(HackflowError::invalid_state(
                "Cannot delete an account that has submitted evaluations",
            ));
        }

        TeamMembers::delete_many()
            .filter(MemberColumn::UserId.eq(user_id))
            .exec(&txn)
            .await
            .map_err(|e| HackflowError::database_operation(format!("退出队伍失败: {e}")))?;

        let result = Users::delete_by_id(user_id)
            .exec(&txn)
            .await
            .map_err(|e| HackflowError::database_operation(format!("删除用户失败: {e}")))?;

        txn.commit()
            .await
            .map_err(|e| HackflowError::database_operation(format!("提交事务失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }
}
