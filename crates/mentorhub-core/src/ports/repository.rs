use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{
    Availability, Comment, CommentThread, MentorDetails, MentorFilter, MentorProfile,
    Notification, NotificationView, Post, PostDetails, PostFilter, ProfileUpdate, Tag, User,
    UserSummary,
};
use crate::error::RepoError;

/// Generic repository trait defining standard CRUD operations.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Insert a new entity.
    async fn insert(&self, entity: T) -> Result<T, RepoError>;

    /// Overwrite every column of an existing entity.
    async fn update(&self, entity: T) -> Result<T, RepoError>;

    /// Delete an entity by its ID.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// User repository with domain-specific methods.
#[async_trait]
pub trait UserRepository: BaseRepository<User, Uuid> {
    /// Find a user by identity-provider subject, deactivated users included.
    async fn find_by_external_id(&self, external_id: &str) -> Result<Option<User>, RepoError>;

    /// Find a user by their email address, deactivated users included.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;

    async fn record_login(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), RepoError>;

    async fn set_password_hash(&self, id: Uuid, hash: &str) -> Result<(), RepoError>;

    /// Write only the editable profile columns and return the stored user.
    async fn update_profile(&self, id: Uuid, update: ProfileUpdate) -> Result<User, RepoError>;

    /// Tombstone the account; the row is kept.
    async fn deactivate(&self, id: Uuid) -> Result<(), RepoError>;

    async fn summaries(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, UserSummary>, RepoError>;
}

#[async_trait]
pub trait MentorRepository: Send + Sync {
    async fn exists(&self, user_id: Uuid) -> Result<bool, RepoError>;

    async fn find(&self, user_id: Uuid) -> Result<Option<MentorProfile>, RepoError>;

    async fn find_details(&self, user_id: Uuid) -> Result<Option<MentorDetails>, RepoError>;

    /// Create the profile, or replace experience, skills, certifications and
    /// availability of an existing one. Returns `true` when created.
    async fn upsert(&self, profile: MentorProfile) -> Result<(MentorProfile, bool), RepoError>;

    async fn set_availability(
        &self,
        user_id: Uuid,
        availability: Vec<Availability>,
    ) -> Result<(), RepoError>;

    async fn list(&self, filter: MentorFilter) -> Result<Vec<MentorDetails>, RepoError>;
}

/// Post repository.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, Uuid> {
    /// The shared original is only loaded when `viewer` may see it.
    async fn find_details(
        &self,
        id: Uuid,
        viewer: Option<Uuid>,
    ) -> Result<Option<PostDetails>, RepoError>;

    /// Newest first.
    async fn list(&self, filter: PostFilter) -> Result<Vec<PostDetails>, RepoError>;

    /// Add one to the view counter.
    async fn record_view(&self, id: Uuid) -> Result<(), RepoError>;

    async fn saved_by(&self, user_id: Uuid) -> Result<Vec<PostDetails>, RepoError>;
}

#[async_trait]
pub trait CommentRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Comment>, RepoError>;

    /// Top-level comments of a post with their replies, oldest first.
    async fn threads(&self, post_id: Uuid) -> Result<Vec<CommentThread>, RepoError>;
}

/// Tag catalogue and tag links. Attaching ignores unknown tag ids and links
/// that already exist, and returns the number of new links.
#[async_trait]
pub trait TagRepository: Send + Sync {
    async fn create(&self, tag: Tag) -> Result<Tag, RepoError>;

    async fn list(&self, category: Option<&str>) -> Result<Vec<Tag>, RepoError>;

    async fn attach_to_user(&self, user_id: Uuid, tag_ids: &[Uuid]) -> Result<usize, RepoError>;

    async fn attach_to_mentor(&self, user_id: Uuid, tag_ids: &[Uuid])
    -> Result<usize, RepoError>;

    async fn attach_to_post(&self, post_id: Uuid, tag_ids: &[Uuid]) -> Result<usize, RepoError>;
}

#[async_trait]
pub trait NotificationRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Notification>, RepoError>;

    /// Newest first, with the actor loaded.
    async fn list_for(&self, user_id: Uuid) -> Result<Vec<NotificationView>, RepoError>;

    async fn mark_read(&self, id: Uuid) -> Result<(), RepoError>;

    async fn mark_all_read(&self, user_id: Uuid) -> Result<u64, RepoError>;
}
