//! Post entity for SeaORM.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

use mentorhub_core::domain::{Post, PostAnalytics};

use super::json::StringList;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "posts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    pub media_urls: StringList,
    pub is_private: bool,
    pub views: i32,
    pub shares: i32,
    pub saved_count: i32,
    pub comment_count: i32,
    pub likes: i32,
    /// Shares point at their original. No foreign key: originals may be
    /// deleted while shares survive.
    pub original_post_id: Option<Uuid>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Conversion from SeaORM Model to Domain Post.
impl From<Model> for Post {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            content: model.content,
            media_urls: model.media_urls.0,
            is_private: model.is_private,
            analytics: PostAnalytics {
                views: model.views,
                shares: model.shares,
                saved_count: model.saved_count,
                comment_count: model.comment_count,
                likes: model.likes,
            },
            original_post_id: model.original_post_id,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }
}

/// Conversion from Domain Post to SeaORM ActiveModel.
impl From<Post> for ActiveModel {
    fn from(post: Post) -> Self {
        Self {
            id: Set(post.id),
            user_id: Set(post.user_id),
            content: Set(post.content),
            media_urls: Set(StringList(post.media_urls)),
            is_private: Set(post.is_private),
            views: Set(post.analytics.views),
            shares: Set(post.analytics.shares),
            saved_count: Set(post.analytics.saved_count),
            comment_count: Set(post.analytics.comment_count),
            likes: Set(post.analytics.likes),
            original_post_id: Set(post.original_post_id),
            created_at: Set(post.created_at.into()),
            updated_at: Set(post.updated_at.into()),
        }
    }
}
