//! 赛事配置存储操作

use super::SeaOrmStorage;
use crate::config::CriterionWeights;
use crate::entity::hackathon_settings::{ActiveModel, Entity as HackathonSettings, SETTINGS_ROW_ID};
use crate::errors::{HackflowError, Result};
use crate::models::hackathon::{entities::HackathonSettings as Settings, requests::HackathonSettingsPatch};
use sea_orm::{ActiveModelTrait, EntityTrait, Set};

impl SeaOrmStorage {
    /// 读取赛事配置；迁移会写入默认行，被删除时返回 `None`
    pub async fn get_hackathon_settings_impl(&self) -> Result<Option<Settings>> {
        let result = HackathonSettings::find_by_id(SETTINGS_ROW_ID)
            .one(&self.db)
            .await
            .map_err(|e| HackflowError::database_operation(format!("获取赛事配置失败: {e}")))?;

        Ok(result.map(|m| m.into_settings()))
    }

    /// 读取赛事配置，不存在时以给定权重创建默认行
    pub async fn get_or_create_hackathon_settings_impl(
        &self,
        default_weights: &CriterionWeights,
    ) -> Result<Settings> {
        if let Some(settings) = self.get_hackathon_settings_impl().await? {
            return Ok(settings);
        }

        let model = ActiveModel {
            id: Set(SETTINGS_ROW_ID),
            name: Set("HackFlow".to_string()),
            tagline: Set(None),
            theme: Set(None),
            description: Set(None),
            start_date: Set(None),
            end_date: Set(None),
            submission_deadline: Set(None),
            judging_start_date: Set(None),
            judging_end_date: Set(None),
            max_team_size: Set(crate::models::teams::entities::DEFAULT_TEAM_SIZE),
            innovation_weight: Set(default_weights.innovation),
            technical_weight: Set(default_weights.technical),
            implementation_weight: Set(default_weights.implementation),
            impact_weight: Set(default_weights.impact),
            allow_late_submissions: Set(false),
            enable_leaderboard: Set(true),
            updated_at: Set(chrono::Utc::now().timestamp()),
            updated_by: Set(None),
        };

        match model.insert(&self.db).await {
            Ok(created) => Ok(created.into_settings()),
            // 并发创建时以先写入者为准
            Err(e) if HackflowError::is_unique_violation(&e) => self
                .get_hackathon_settings_impl()
                .await?
                .ok_or_else(|| HackflowError::not_found("Hackathon settings not found")),
            Err(e) => Err(HackflowError::database_operation(format!(
                "创建赛事配置失败: {e}"
            ))),
        }
    }

    /// 写入配置变更，仅更新补丁中给出的字段
    pub async fn update_hackathon_settings_impl(
        &self,
        patch: HackathonSettingsPatch,
        default_weights: &CriterionWeights,
        user_id: i64,
    ) -> Result<Settings> {
        // 确保配置行存在
        self.get_or_create_hackathon_settings_impl(default_weights)
            .await?;

        let mut model = ActiveModel {
            id: Set(SETTINGS_ROW_ID),
            updated_at: Set(chrono::Utc::now().timestamp()),
            updated_by: Set(Some(user_id)),
            ..Default::default()
        };

        if let Some(name) = patch.name {
            model.name = Set(name);
        }
        if let Some(tagline) = patch.tagline {
            model.tagline = Set(Some(tagline));
        }
        if let Some(theme) = patch.theme {
            model.theme = Set(Some(theme));
        }
        if let Some(description) = patch.description {
            model.description = Set(Some(description));
        }
        if let Some(ts) = patch.start_date {
            model.start_date = Set(Some(ts));
        }
        if let Some(ts) = patch.end_date {
            model.end_date = Set(Some(ts));
        }
        if let Some(ts) = patch.submission_deadline {
            model.submission_deadline = Set(Some(ts));
        }
        if let Some(ts) = patch.judging_start_date {
            model.judging_start_date = Set(Some(ts));
        }
        if let Some(ts) = patch.judging_end_date {
            model.judging_end_date = Set(Some(ts));
        }
        if let Some(size) = patch.max_team_size {
            model.max_team_size = Set(size);
        }
        if let Some(weights) = patch.judging_weights {
            model.innovation_weight = Set(weights.innovation);
            model.technical_weight = Set(weights.technical);
            model.implementation_weight = Set(weights.implementation);
            model.impact_weight = Set(weights.impact);
        }
        if let Some(allow) = patch.allow_late_submissions {
            model.allow_late_submissions = Set(allow);
        }
        if let Some(enable) = patch.enable_leaderboard {
            model.enable_leaderboard = Set(enable);
        }

        let updated = model
            .update(&self.db)
            .await
            .map_err(|e| HackflowError::database_operation(format!("更新赛事配置失败: {e}")))?;

        Ok(updated.into_settings())
    }
}
