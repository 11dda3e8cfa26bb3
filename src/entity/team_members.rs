//! 队伍成员实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "team_members")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub team_id: i64,
    #[sea_orm(unique)]
    pub user_id: i64,
    pub role: String,
    pub joined_at: i64,
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
        from = "Column::UserId",
        to = "super::users::Column::Id"
    )]
    User,
}

impl Related<super::teams::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Team.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_member(
        self,
        user: super::users::Model,
    ) -> crate::models::teams::entities::TeamMember {
        use crate::models::teams::entities::{TeamMember, TeamRole};

        TeamMember {
            user_id: self.user_id,
            display_name: user.display_name.unwrap_or_else(|| user.username.clone()),
            username: user.username,
            avatar_url: user.avatar_url,
            role: self.role.parse().unwrap_or(TeamRole::Member),
            joined_at: chrono::DateTime::from_timestamp(self.joined_at, 0).unwrap_or_default(),
        }
    }
}
