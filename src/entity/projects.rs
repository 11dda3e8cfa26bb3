//! 参赛项目实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "projects")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub team_id: i64,
    pub created_by: Option<i64>,
    pub title: String,
    pub tagline: Option<String>,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub category: String, // 赛道 slug
    #[sea_orm(column_type = "Text", nullable)]
    pub technologies: Option<String>, // JSON 数组
    pub demo_url: Option<String>,
    pub video_url: Option<String>,
    pub github_url: Option<String>,
    pub submission_status: String,
    pub submitted_at: Option<i64>,
    pub total_score: f64,
    pub average_score: f64,
    pub evaluation_count: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::teams::Entity",
        from = "Column::TeamId",
        to = "super::teams::Column::Id"
    )]
    Team,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::CreatedBy",
        to = "super::users::Column::Id"
    )]
    Creator,
    #[sea_orm(has_many = "super::evaluations::Entity")]
    Evaluations,
    #[sea_orm(has_many = "super::project_files::Entity")]
    Files,
}

impl Related<super::teams::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Team.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Creator.def()
    }
}

impl Related<super::evaluations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Evaluations.def()
    }
}

impl Related<super::project_files::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Files.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_project(self) -> crate::models::projects::entities::Project {
        use crate::models::projects::entities::{Project, SubmissionStatus};
        use chrono::{DateTime, Utc};

        let technologies = self
            .technologies
            .as_deref()
            .and_then(|raw| serde_json::from_str::<Vec<String>>(raw).ok())
            .unwrap_or_default();

        Project {
            id: self.id,
            team_id: self.team_id,
            created_by: self.created_by,
            title: self.title,
            tagline: self.tagline,
            description: self.description,
            category: self.category,
            technologies,
            demo_url: self.demo_url,
            video_url: self.video_url,
            github_url: self.github_url,
            submission_status: self
                .submission_status
                .parse::<SubmissionStatus>()
                .unwrap_or(SubmissionStatus::Draft),
            submitted_at: self
                .submitted_at
                .map(|ts| DateTime::<Utc>::from_timestamp(ts, 0).unwrap_or_default()),
            total_score: self.total_score,
            average_score: self.average_score,
            evaluation_count: self.evaluation_count,
            created_at: DateTime::<Utc>::from_timestamp(self.created_at, 0).unwrap_or_default(),
            updated_at: DateTime::<Utc>::from_timestamp(self.updated_at, 0).unwrap_or_default(),
        }
    }

    pub fn into_score(self) -> crate::models::projects::entities::ProjectScore {
        use crate::models::projects::entities::{ProjectScore, SubmissionStatus};

        ProjectScore {
            project_id: self.id,
            total_score: self.total_score,
            average_score: self.average_score,
            evaluation_count: self.evaluation_count,
            submission_status: self
                .submission_status
                .parse::<SubmissionStatus>()
                .unwrap_or(SubmissionStatus::Draft),
        }
    }
}
