//! 项目附件存储操作

use super::SeaOrmStorage;
use crate::entity::project_files::{ActiveModel, Column, Entity as ProjectFiles};
use crate::errors::{HackflowError, Result};
use crate::models::files::entities::{NewProjectFile, ProjectFile};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};

impl SeaOrmStorage {
    /// 记录项目附件
    pub async fn create_project_file_impl(&self, file: NewProjectFile) -> Result<ProjectFile> {
        let model = ActiveModel {
            project_id: Set(file.project_id),
            original_name: Set(file.original_name),
            stored_name: Set(file.stored_name),
            file_size: Set(file.file_size),
            file_type: Set(file.file_type),
            uploaded_by: Set(file.uploaded_by),
            created_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| HackflowError::database_operation(format!("记录项目附件失败: {e}")))?;

        Ok(result.into_file())
    }

    /// 列出项目附件
    pub async fn list_project_files_impl(&self, project_id: i64) -> Result<Vec<ProjectFile>> {
        let models = ProjectFiles::find()
            .filter(Column::ProjectId.eq(project_id))
            .order_by_asc(Column::CreatedAt)
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| HackflowError::database_operation(format!("查询项目附件失败: {e}")))?;

        Ok(models.into_iter().map(|m| m.into_file()).collect())
    }
}
