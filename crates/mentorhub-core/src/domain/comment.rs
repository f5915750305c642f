use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::UserSummary;

/// Comment entity. Replies carry the id of their top-level comment in
/// `parent_id`; threads are never deeper than one level.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: Uuid,
    pub post_id: Uuid,
    pub user_id: Uuid,
    pub parent_id: Option<Uuid>,
    pub content: String,
    pub likes: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(post_id: Uuid, user_id: Uuid, content: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            post_id,
            user_id,
            parent_id: None,
            content,
            likes: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// A reply to `parent`. Replying to a reply attaches to the thread root.
    pub fn reply_to(parent: &Comment, user_id: Uuid, content: String) -> Self {
        let mut reply = Self::new(parent.post_id, user_id, content);
        reply.parent_id = Some(parent.parent_id.unwrap_or(parent.id));
        reply
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
    #[serde(flatten)]
    pub comment: Comment,
    pub author: Option<UserSummary>,
}

/// A top-level comment and its replies, oldest first.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentThread {
    #[serde(flatten)]
    pub comment: CommentView,
    pub replies: Vec<CommentView>,
}
