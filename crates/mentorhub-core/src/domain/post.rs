use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Tag, UserSummary};

/// Counters maintained transactionally by the engagement engine.
///
/// `comment_count` is the only comment counter; it is never recomputed
/// from a live count at read time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostAnalytics {
    pub views: i32,
    pub shares: i32,
    pub saved_count: i32,
    pub comment_count: i32,
    pub likes: i32,
}

impl PostAnalytics {
    /// Interactions per hundred views. Zero when the post was never viewed.
    pub fn engagement_rate(&self) -> f64 {
        if self.views <= 0 {
            return 0.0;
        }
        let interactions = self.likes + self.comment_count + self.shares + self.saved_count;
        f64::from(interactions) / f64::from(self.views) * 100.0
    }
}

/// Post entity. A share is a post whose `original_post_id` is set.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: Uuid,
    pub user_id: Uuid,
    pub content: String,
    pub media_urls: Vec<String>,
    pub is_private: bool,
    pub analytics: PostAnalytics,
    pub original_post_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// Create a new post.
    pub fn new(user_id: Uuid, content: String, media_urls: Vec<String>, is_private: bool) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            content,
            media_urls,
            is_private,
            analytics: PostAnalytics::default(),
            original_post_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// A public re-post of `original` owned by `user_id`.
    pub fn share_of(user_id: Uuid, original: &Post, content: String) -> Self {
        let mut shared = Self::new(user_id, content, Vec::new(), false);
        shared.original_post_id = Some(original.id);
        shared
    }

    pub fn is_visible_to(&self, viewer: Option<Uuid>) -> bool {
        !self.is_private || viewer == Some(self.user_id)
    }
}

/// Post listing filters.
#[derive(Debug, Clone)]
pub struct PostFilter {
    pub tag: Option<String>,
    pub user_id: Option<Uuid>,
    /// Every term must appear in the content.
    pub search_terms: Vec<String>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    /// Private posts are only listed for their owner.
    pub viewer: Option<Uuid>,
    pub limit: u64,
    pub offset: u64,
}

impl Default for PostFilter {
    fn default() -> Self {
        Self {
            tag: None,
            user_id: None,
            search_terms: Vec::new(),
            start: None,
            end: None,
            viewer: None,
            limit: 20,
            offset: 0,
        }
    }
}

/// A post with its author, tags and shared original loaded.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostDetails {
    #[serde(flatten)]
    pub post: Post,
    pub author: Option<UserSummary>,
    pub tags: Vec<Tag>,
    pub original_post: Option<Post>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engagement_rate_without_views_is_zero() {
        let analytics = PostAnalytics {
            likes: 4,
            ..Default::default()
        };
        assert_eq!(analytics.engagement_rate(), 0.0);
    }

    #[test]
    fn test_engagement_rate() {
        let analytics = PostAnalytics {
            views: 50,
            likes: 3,
            comment_count: 1,
            shares: 0,
            saved_count: 1,
        };
        assert!((analytics.engagement_rate() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_private_post_visible_only_to_owner() {
        let owner = Uuid::new_v4();
        let post = Post::new(owner, "draft".to_string(), vec![], true);

        assert!(post.is_visible_to(Some(owner)));
        assert!(!post.is_visible_to(Some(Uuid::new_v4())));
        assert!(!post.is_visible_to(None));
    }

    #[test]
    fn test_share_points_at_original() {
        let original = Post::new(Uuid::new_v4(), "hello".to_string(), vec![], false);
        let sharer = Uuid::new_v4();
        let shared = Post::share_of(sharer, &original, String::new());

        assert_eq!(shared.original_post_id, Some(original.id));
        assert_eq!(shared.user_id, sharer);
        assert!(!shared.is_private);
    }
}
