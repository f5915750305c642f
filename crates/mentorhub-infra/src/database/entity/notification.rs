//! Notification entity.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

use mentorhub_core::domain::{Notification, NotificationKind};
use mentorhub_core::error::RepoError;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "notifications")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Recipient.
    pub user_id: Uuid,
    pub actor_id: Uuid,
    pub post_id: Option<Uuid>,
    #[sea_orm(column_name = "type")]
    pub kind: String,
    #[sea_orm(column_type = "Text")]
    pub message: String,
    pub is_read: bool,
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
    Recipient,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::ActorId",
        to = "super::user::Column::Id"
    )]
    Actor,
    #[sea_orm(
        belongs_to = "super::post::Entity",
        from = "Column::PostId",
        to = "super::post::Column::Id"
    )]
    Post,
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Notification {
    type Error = RepoError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let kind = NotificationKind::parse(&model.kind).ok_or_else(|| {
            RepoError::Query(format!("unknown notification type '{}'", model.kind))
        })?;

        Ok(Self {
            id: model.id,
            user_id: model.user_id,
            actor_id: model.actor_id,
            post_id: model.post_id,
            kind,
            message: model.message,
            is_read: model.is_read,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        })
    }
}

impl From<Notification> for ActiveModel {
    fn from(notification: Notification) -> Self {
        Self {
            id: Set(notification.id),
            user_id: Set(notification.user_id),
            actor_id: Set(notification.actor_id),
            post_id: Set(notification.post_id),
            kind: Set(notification.kind.as_str().to_string()),
            message: Set(notification.message),
            is_read: Set(notification.is_read),
            created_at: Set(notification.created_at.into()),
            updated_at: Set(notification.updated_at.into()),
        }
    }
}
