//! Multi-entity writes: likes, follows, comments, shares, saves and post
//! deletion.
//!
//! Every mutating method runs in a single store transaction. The primary row
//! is written first, then counters (relative deltas applied by the store),
//! then notifications. Any failure rolls the whole transaction back.
//! Duplicate likes, follows and saves are detected by the store's uniqueness
//! constraints and reported as [`DomainError::Conflict`].

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Comment, Connection, Follow, Like, Liker, Post};
use crate::error::DomainError;

#[async_trait]
pub trait EngagementRepository: Send + Sync {
    /// Insert the like, bump `likes`, notify the owner unless they liked
    /// their own post.
    async fn like_post(&self, user_id: Uuid, post_id: Uuid) -> Result<Like, DomainError>;

    /// Remove the like and decrement `likes`, never below zero.
    async fn unlike_post(&self, user_id: Uuid, post_id: Uuid) -> Result<(), DomainError>;

    /// Insert the follow and notify the followed user.
    async fn follow(&self, follower_id: Uuid, following_id: Uuid) -> Result<Follow, DomainError>;

    async fn unfollow(&self, follower_id: Uuid, following_id: Uuid) -> Result<(), DomainError>;

    /// Insert a top-level comment and bump `comment_count`.
    async fn comment(
        &self,
        user_id: Uuid,
        post_id: Uuid,
        content: String,
    ) -> Result<Comment, DomainError>;

    /// Insert a reply and bump `comment_count` of the parent's post.
    async fn reply(
        &self,
        user_id: Uuid,
        parent_id: Uuid,
        content: String,
    ) -> Result<Comment, DomainError>;

    /// Insert a post pointing at the original and bump its `shares`.
    async fn share_post(
        &self,
        user_id: Uuid,
        post_id: Uuid,
        content: String,
    ) -> Result<Post, DomainError>;

    /// Insert the save link and bump `saved_count`.
    async fn save_post(&self, user_id: Uuid, post_id: Uuid) -> Result<(), DomainError>;

    /// Delete the post's likes, comments, tag links, save links and
    /// notifications, then the post. Only the owner may delete. Returns the
    /// deleted post so its media can be cleaned up.
    async fn delete_post(&self, user_id: Uuid, post_id: Uuid) -> Result<Post, DomainError>;

    async fn followers(&self, user_id: Uuid) -> Result<Vec<Connection>, DomainError>;

    async fn following(&self, user_id: Uuid) -> Result<Vec<Connection>, DomainError>;

    async fn likers(&self, post_id: Uuid) -> Result<Vec<Liker>, DomainError>;
}
