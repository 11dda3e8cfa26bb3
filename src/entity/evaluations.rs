//! 评审实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "evaluations")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub project_id: i64,
    pub judge_id: i64,
    pub innovation_score: Option<f64>,
    pub innovation_weight: f64,
    pub technical_score: Option<f64>,
    pub technical_weight: f64,
    pub implementation_score: Option<f64>,
    pub implementation_weight: f64,
    pub impact_score: Option<f64>,
    pub impact_weight: f64,
    pub total_score: f64,
    pub weighted_score: f64,
    #[sea_orm(column_type = "Text", nullable)]
    pub strengths: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub improvements: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub general_comments: Option<String>,
    pub recommendation: String,
    pub is_complete: bool,
    pub submitted_at: Option<i64>,
    pub version: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::projects::Entity",
        from = "Column::ProjectId",
        to = "super::projects::Column::Id"
    )]
    Project,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::JudgeId",
        to = "super::users::Column::Id"
    )]
    Judge,
}

impl Related<super::projects::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Project.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Judge.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_evaluation(self) -> crate::models::evaluations::entities::Evaluation {
        use crate::models::evaluations::entities::{
            CriterionScore, Evaluation, Feedback, Recommendation, ScoreSheet,
        };
        use chrono::{DateTime, Utc};

        Evaluation {
            id: self.id,
            project_id: self.project_id,
            judge_id: self.judge_id,
            scores: ScoreSheet {
                innovation: CriterionScore::new(self.innovation_score, self.innovation_weight),
                technical: CriterionScore::new(self.technical_score, self.technical_weight),
                implementation: CriterionScore::new(
                    self.implementation_score,
                    self.implementation_weight,
                ),
                impact: CriterionScore::new(self.impact_score, self.impact_weight),
            },
            total_score: self.total_score,
            weighted_score: self.weighted_score,
            feedback: Feedback {
                strengths: self.strengths,
                improvements: self.improvements,
                general_comments: self.general_comments,
            },
            recommendation: self
                .recommendation
                .parse::<Recommendation>()
                .unwrap_or(Recommendation::Neutral),
            is_complete: self.is_complete,
            submitted_at: self
                .submitted_at
                .map(|ts| DateTime::<Utc>::from_timestamp(ts, 0).unwrap_or_default()),
            version: self.version,
            created_at: DateTime::<Utc>::from_timestamp(self.created_at, 0).unwrap_or_default(),
            updated_at: DateTime::<Utc>::from_timestamp(self.updated_at, 0).unwrap_or_default(),
        }
    }
}
