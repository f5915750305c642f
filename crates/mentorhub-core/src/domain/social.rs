use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::UserSummary;
use crate::error::DomainError;

/// At most one like per (user, post).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Like {
    pub user_id: Uuid,
    pub post_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Like {
    pub fn new(user_id: Uuid, post_id: Uuid) -> Self {
        Self {
            user_id,
            post_id,
            created_at: Utc::now(),
        }
    }
}

/// At most one follow per (follower, following); never self-referencing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Follow {
    pub follower_id: Uuid,
    pub following_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Follow {
    pub fn new(follower_id: Uuid, following_id: Uuid) -> Result<Self, DomainError> {
        if follower_id == following_id {
            return Err(DomainError::Validation("Cannot follow yourself".to_string()));
        }
        Ok(Self {
            follower_id,
            following_id,
            created_at: Utc::now(),
        })
    }
}

/// A follower or followed user as listed on a profile.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub id: Uuid,
    pub name: String,
    pub avatar_url: Option<String>,
    pub followed_at: DateTime<Utc>,
}

impl Connection {
    pub fn new(user: UserSummary, followed_at: DateTime<Utc>) -> Self {
        Self {
            id: user.id,
            name: user.name,
            avatar_url: user.avatar_url,
            followed_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Liker {
    pub user: UserSummary,
    pub liked_at: DateTime<Utc>,
}
