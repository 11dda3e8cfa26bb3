//! 赛道存储操作

use super::SeaOrmStorage;
use crate::entity::categories::{ActiveModel, Column, Entity as Categories};
use crate::entity::projects::{Column as ProjectColumn, Entity as Projects};
use crate::entity::teams::{Column as TeamColumn, Entity as Teams};
use crate::errors::{HackflowError, Result};
use crate::models::categories::{
    entities::Category,
    requests::{CreateCategoryRequest, UpdateCategoryRequest},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};

impl SeaOrmStorage {
    /// 按 display_order、名称排序列出赛道
    pub async fn list_categories_impl(&self, active_only: bool) -> Result<Vec<Category>> {
        let mut select = Categories::find();
        if active_only {
            select = select.filter(Column::IsActive.eq(true));
        }

        let models = select
            .order_by_asc(Column::DisplayOrder)
            .order_by_asc(Column::Name)
            .all(&self.db)
            .await
            .map_err(|e| HackflowError::database_operation(format!("查询赛道列表失败: {e}")))?;

        Ok(models.into_iter().map(|m| m.into_category()).collect())
    }

    pub async fn get_category_by_id_impl(&self, id: i64) -> Result<Option<Category>> {
        let result = Categories::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| HackflowError::database_operation(format!("查询赛道失败: {e}")))?;

        Ok(result.map(|m| m.into_category()))
    }

    pub async fn get_category_by_slug_impl(&self, slug: &str) -> Result<Option<Category>> {
        let result = Categories::find()
            .filter(Column::Slug.eq(slug))
            .one(&self.db)
            .await
            .map_err(|e| HackflowError::database_operation(format!("查询赛道失败: {e}")))?;

        Ok(result.map(|m| m.into_category()))
    }

    /// 名称或 slug 冲突返回 `Conflict`
    pub async fn create_category_impl(
        &self,
        slug: String,
        req: CreateCategoryRequest,
    ) -> Result<Category> {
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            name: Set(req.name.trim().to_string()),
            slug: Set(slug),
            description: Set(req.description),
            icon: Set(req.icon),
            color: Set(req.color),
            prize_amount: Set(req.prize_amount.unwrap_or(0.0)),
            max_teams: Set(req.max_teams),
            display_order: Set(req.display_order.unwrap_or(0)),
            is_active: Set(req.is_active.unwrap_or(true)),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        match model.insert(&self.db).await {
            Ok(created) => Ok(created.into_category()),
            Err(e) if HackflowError::is_unique_violation(&e) => Err(HackflowError::conflict(
                "A category with this name or slug already exists",
            )),
            Err(e) => Err(HackflowError::database_operation(format!("创建赛道失败: {e}"))),
        }
    }

    /// slug 不可修改
    pub async fn update_category_impl(
        &self,
        id: i64,
        update: UpdateCategoryRequest,
    ) -> Result<Option<Category>> {
        if self.get_category_by_id_impl(id).await?.is_none() {
            return Ok(None);
        }

        let mut model = ActiveModel {
            id: Set(id),
            updated_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        if let Some(name) = update.name {
            model.name = Set(name.trim().to_string());
        }
        if let Some(description) = update.description {
            model.description = Set(Some(description));
        }
        if let Some(icon) = update.icon {
            model.icon = Set(Some(icon));
        }
        if let Some(color) = update.color {
            model.color = Set(Some(color));
        }
        if let Some(prize_amount) = update.prize_amount {
            model.prize_amount = Set(prize_amount);
        }
        if let Some(max_teams) = update.max_teams {
            model.max_teams = Set(Some(max_teams));
        }
        if let Some(display_order) = update.display_order {
            model.display_order = Set(display_order);
        }
        if let Some(is_active) = update.is_active {
            model.is_active = Set(is_active);
        }

        let result = model.update(&self.db).await.map_err(|e| {
            if HackflowError::is_unique_violation(&e) {
                HackflowError::conflict("A category with this name already exists")
            } else {
                HackflowError::database_operation(format!("更新赛道失败: {e}"))
            }
        })?;

        Ok(Some(result.into_category()))
    }

    /// 仍被队伍或项目引用的赛道不能删除，返回 `InvalidState`
    pub async fn delete_category_impl(&self, id: i64) -> Result<bool> {
        let Some(category) = self.get_category_by_id_impl(id).await? else {
            return Ok(false);
        };

        let teams = self.count_teams_in_category_impl(&category.slug).await?;
        let projects = Projects::find()
            .filter(ProjectColumn::Category.eq(category.slug.as_str()))
            .count(&self.db)
            .await
            .map_err(|e| HackflowError::database_operation(format!("统计项目数量失败: {e}")))?;
        if teams > 0 || projects > 0 {
            return Err(HackflowError::invalid_state(format!(
                "Cannot delete category. {teams} teams and {projects} projects are using it."
            )));
        }

        let result = Categories::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| HackflowError::database_operation(format!("删除赛道失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }

    pub async fn count_teams_in_category_impl(&self, slug: &str) -> Result<u64> {
        Teams::find()
            .filter(TeamColumn::Category.eq(slug))
            .count(&self.db)
            .await
            .map_err(|e| HackflowError::database_operation(format!("统计队伍数量失败: {e}")))
    }
}
