//! Post like. The composite primary key makes a second like a unique
//! violation.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

use mentorhub_core::domain::Like;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "likes")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: Uuid,
    #[sea_orm(primary_key, auto_increment = false)]
    pub post_id: Uuid,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
    #[sea_orm(
        belongs_to = "super::post::Entity",
        from = "Column::PostId",
        to = "super::post::Column::Id"
    )]
    Post,
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Like> for ActiveModel {
    fn from(like: Like) -> Self {
        Self {
            user_id: Set(like.user_id),
            post_id: Set(like.post_id),
            created_at: Set(like.created_at.into()),
        }
    }
}
