use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::UserSummary;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Follow,
    Like,
    Comment,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Follow => "follow",
            NotificationKind::Like => "like",
            NotificationKind::Comment => "comment",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "follow" => Some(NotificationKind::Follow),
            "like" => Some(NotificationKind::Like),
            "comment" => Some(NotificationKind::Comment),
            _ => None,
        }
    }
}

/// Fan-out notification addressed to `user_id`, caused by `actor_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub actor_id: Uuid,
    pub post_id: Option<Uuid>,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub message: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Notification {
    fn new(
        user_id: Uuid,
        actor_id: Uuid,
        post_id: Option<Uuid>,
        kind: NotificationKind,
        message: String,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            actor_id,
            post_id,
            kind,
            message,
            is_read: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn follow(recipient: Uuid, actor_id: Uuid, actor_name: &str) -> Self {
        Self::new(
            recipient,
            actor_id,
            None,
            NotificationKind::Follow,
            format!("{actor_name} started following you"),
        )
    }

    pub fn like(recipient: Uuid, actor_id: Uuid, actor_name: &str, post_id: Uuid) -> Self {
        Self::new(
            recipient,
            actor_id,
            Some(post_id),
            NotificationKind::Like,
            format!("{actor_name} liked your post"),
        )
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationView {
    #[serde(flatten)]
    pub notification: Notification,
    pub actor: Option<UserSummary>,
}
