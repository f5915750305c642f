//! Follow edge between two users.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

use mentorhub_core::domain::Follow;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "follows")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub follower_id: Uuid,
    #[sea_orm(primary_key, auto_increment = false)]
    pub following_id: Uuid,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::FollowerId",
        to = "super::user::Column::Id"
    )]
    Follower,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::FollowingId",
        to = "super::user::Column::Id"
    )]
    Following,
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Follow> for ActiveModel {
    fn from(follow: Follow) -> Self {
        Self {
            follower_id: Set(follow.follower_id),
            following_id: Set(follow.following_id),
            created_at: Set(follow.created_at.into()),
        }
    }
}
