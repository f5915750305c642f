//! Comment entity. `parent_id` is at most one level deep.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

use mentorhub_core::domain::Comment;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "comments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub post_id: Uuid,
    pub user_id: Uuid,
    pub parent_id: Option<Uuid>,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    pub likes: i32,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::post::Entity",
        from = "Column::PostId",
        to = "super::post::Column::Id"
    )]
    Post,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Comment {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            post_id: model.post_id,
            user_id: model.user_id,
            parent_id: model.parent_id,
            content: model.content,
            likes: model.likes,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }
}

impl From<Comment> for ActiveModel {
    fn from(comment: Comment) -> Self {
        Self {
            id: Set(comment.id),
            post_id: Set(comment.post_id),
            user_id: Set(comment.user_id),
            parent_id: Set(comment.parent_id),
            content: Set(comment.content),
            likes: Set(comment.likes),
            created_at: Set(comment.created_at.into()),
            updated_at: Set(comment.updated_at.into()),
        }
    }
}
