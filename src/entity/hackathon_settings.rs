//! 赛事配置实体（单行，id 固定为 1）

use sea_orm::entity::prelude::*;

pub const SETTINGS_ROW_ID: i64 = 1;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "hackathon_settings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i64,
    pub name: String,
    pub tagline: Option<String>,
    pub theme: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub start_date: Option<i64>,
    pub end_date: Option<i64>,
    pub submission_deadline: Option<i64>,
    pub judging_start_date: Option<i64>,
    pub judging_end_date: Option<i64>,
    pub max_team_size: i64,
    pub innovation_weight: f64,
    pub technical_weight: f64,
    pub implementation_weight: f64,
    pub impact_weight: f64,
    pub allow_late_submissions: bool,
    pub enable_leaderboard: bool,
    pub updated_at: i64,
    pub updated_by: Option<i64>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

fn to_datetime(ts: i64) -> chrono::DateTime<chrono::Utc> {
    chrono::DateTime::from_timestamp(ts, 0).unwrap_or_default()
}

impl Model {
    pub fn into_settings(self) -> crate::models::hackathon::entities::HackathonSettings {
        use crate::config::CriterionWeights;

        crate::models::hackathon::entities::HackathonSettings {
            name: self.name,
            tagline: self.tagline,
            theme: self.theme,
            description: self.description,
            start_date: self.start_date.map(to_datetime),
            end_date: self.end_date.map(to_datetime),
            submission_deadline: self.submission_deadline.map(to_datetime),
            judging_start_date: self.judging_start_date.map(to_datetime),
            judging_end_date: self.judging_end_date.map(to_datetime),
            max_team_size: self.max_team_size,
            judging_weights: CriterionWeights {
                innovation: self.innovation_weight,
                technical: self.technical_weight,
                implementation: self.implementation_weight,
                impact: self.impact_weight,
            },
            allow_late_submissions: self.allow_late_submissions,
            enable_leaderboard: self.enable_leaderboard,
            updated_at: to_datetime(self.updated_at),
            updated_by: self.updated_by,
        }
    }
}
