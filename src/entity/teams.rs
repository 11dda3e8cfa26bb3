//! 队伍实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "teams")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub name: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub category: String,
    pub leader_id: i64,
    #[sea_orm(unique)]
    pub invite_code: String,
    pub max_members: i64,
    pub looking_for_members: bool,
    #[sea_orm(column_type = "Text", nullable)]
    pub required_skills: Option<String>, // JSON 数组
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::LeaderId",
        to = "super::users::Column::Id"
    )]
    Leader,
    #[sea_orm(has_many = "super::team_members::Entity")]
    Members,
    #[sea_orm(has_one = "super::projects::Entity")]
    Project,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Leader.def()
    }
}

impl Related<super::team_members::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Members.def()
    }
}

impl Related<super::projects::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Project.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// `member_count` 由调用方统计后传入
    pub fn into_team(self, member_count: i64) -> crate::models::teams::entities::Team {
        use chrono::{DateTime, Utc};

        let required_skills = self
            .required_skills
            .as_deref()
            .and_then(|raw| serde_json::from_str::<Vec<String>>(raw).ok())
            .unwrap_or_default();

        crate::models::teams::entities::Team {
            id: self.id,
            name: self.name,
            description: self.description,
            category: self.category,
            leader_id: self.leader_id,
            invite_code: Some(self.invite_code),
            max_members: self.max_members,
            member_count,
            looking_for_members: self.looking_for_members,
            required_skills,
            created_at: DateTime::<Utc>::from_timestamp(self.created_at, 0).unwrap_or_default(),
            updated_at: DateTime::<Utc>::from_timestamp(self.updated_at, 0).unwrap_or_default(),
        }
    }
}
