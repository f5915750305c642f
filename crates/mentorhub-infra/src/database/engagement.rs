//! Transactional engagement writes.
//!
//! Each mutation opens one transaction and commits it explicitly at the end.
//! An early return drops the transaction, which rolls it back.

use async_trait::async_trait;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, DatabaseTransaction, DbConn, DbErr, EntityTrait, QueryFilter, QueryOrder,
    TransactionTrait,
};
use uuid::Uuid;

use mentorhub_core::domain::{Comment, Connection, Follow, Like, Liker, Notification, Post};
use mentorhub_core::error::{DomainError, RepoError};
use mentorhub_core::ports::EngagementRepository;

use super::entity::{comment, follow, like, notification, post, post_tag, saved_post, user};
use super::error::map_db_err;
use super::loaders;

fn store_err(err: DbErr) -> DomainError {
    map_db_err(err).into()
}

/// Unique violations become a conflict carrying `message`.
fn duplicate(err: DbErr, message: &str) -> DomainError {
    match map_db_err(err) {
        RepoError::Constraint(_) => DomainError::Conflict(message.to_string()),
        other => other.into(),
    }
}

fn require_content(content: &str) -> Result<(), DomainError> {
    if content.trim().is_empty() {
        return Err(DomainError::Validation("Content is required".to_string()));
    }
    Ok(())
}

async fn find_post(txn: &DatabaseTransaction, post_id: Uuid) -> Result<Post, DomainError> {
    post::Entity::find_by_id(post_id)
        .one(txn)
        .await
        .map_err(store_err)?
        .map(Post::from)
        .ok_or_else(|| DomainError::not_found("Post", post_id))
}

async fn actor_name(txn: &DatabaseTransaction, user_id: Uuid) -> Result<String, DomainError> {
    let actor = user::Entity::find_by_id(user_id)
        .one(txn)
        .await
        .map_err(store_err)?;

    Ok(actor.map_or_else(|| "Someone".to_string(), |u| u.name))
}

/// Relative `+1` on one post counter.
async fn increment(
    txn: &DatabaseTransaction,
    post_id: Uuid,
    counter: post::Column,
) -> Result<(), DomainError> {
    let result = post::Entity::update_many()
        .col_expr(counter, Expr::col(counter).add(1))
        .filter(post::Column::Id.eq(post_id))
        .exec(txn)
        .await
        .map_err(store_err)?;

    if result.rows_affected == 0 {
        return Err(DomainError::not_found("Post", post_id));
    }
    Ok(())
}

/// Relative `-1` on one post counter, never below zero.
async fn decrement(
    txn: &DatabaseTransaction,
    post_id: Uuid,
    counter: post::Column,
) -> Result<(), DomainError> {
    post::Entity::update_many()
        .col_expr(counter, Expr::col(counter).sub(1))
        .filter(post::Column::Id.eq(post_id))
        .filter(counter.gt(0))
        .exec(txn)
        .await
        .map_err(store_err)?;
    Ok(())
}

async fn notify(txn: &DatabaseTransaction, notification: Notification) -> Result<(), DomainError> {
    notification::Entity::insert(notification::ActiveModel::from(notification))
        .exec_without_returning(txn)
        .await
        .map_err(store_err)?;
    Ok(())
}

/// SeaORM implementation of the engagement engine.
pub struct PostgresEngagementRepository {
    db: DbConn,
}

impl PostgresEngagementRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }

    async fn begin(&self) -> Result<DatabaseTransaction, DomainError> {
        self.db.begin().await.map_err(store_err)
    }

    async fn connections(
        &self,
        edges: Vec<(Uuid, chrono::DateTime<chrono::Utc>)>,
    ) -> Result<Vec<Connection>, DomainError> {
        let ids: Vec<Uuid> = edges.iter().map(|(id, _)| *id).collect();
        let mut users = loaders::user_summaries(&self.db, &ids).await?;

        Ok(edges
            .into_iter()
            .filter_map(|(id, at)| users.remove(&id).map(|user| Connection::new(user, at)))
            .collect())
    }
}

#[async_trait]
impl EngagementRepository for PostgresEngagementRepository {
    async fn like_post(&self, user_id: Uuid, post_id: Uuid) -> Result<Like, DomainError> {
        let txn = self.begin().await?;
        let post = find_post(&txn, post_id).await?;

        let like = Like::new(user_id, post_id);
        like::Entity::insert(like::ActiveModel::from(like.clone()))
            .exec_without_returning(&txn)
            .await
            .map_err(|e| duplicate(e, "Post already liked"))?;

        increment(&txn, post_id, post::Column::Likes).await?;

        if post.user_id != user_id {
            let name = actor_name(&txn, user_id).await?;
            notify(&txn, Notification::like(post.user_id, user_id, &name, post_id)).await?;
        }

        txn.commit().await.map_err(store_err)?;

        tracing::debug!(user_id = %user_id, post_id = %post_id, "Post liked");
        Ok(like)
    }

    async fn unlike_post(&self, user_id: Uuid, post_id: Uuid) -> Result<(), DomainError> {
        let txn = self.begin().await?;

        let removed = like::Entity::delete_many()
            .filter(like::Column::UserId.eq(user_id))
            .filter(like::Column::PostId.eq(post_id))
            .exec(&txn)
            .await
            .map_err(store_err)?;

        if removed.rows_affected == 0 {
            return Err(DomainError::Missing("Like not found".to_string()));
        }

        decrement(&txn, post_id, post::Column::Likes).await?;
        txn.commit().await.map_err(store_err)?;

        tracing::debug!(user_id = %user_id, post_id = %post_id, "Post unliked");
        Ok(())
    }

    async fn follow(&self, follower_id: Uuid, following_id: Uuid) -> Result<Follow, DomainError> {
        let follow = Follow::new(follower_id, following_id)?;

        let txn = self.begin().await?;

        let exists = user::Entity::find_by_id(following_id)
            .one(&txn)
            .await
            .map_err(store_err)?
            .is_some();
        if !exists {
            return Err(DomainError::not_found("User", following_id));
        }

        follow::Entity::insert(follow::ActiveModel::from(follow.clone()))
            .exec_without_returning(&txn)
            .await
            .map_err(|e| duplicate(e, "Already following this user"))?;

        let name = actor_name(&txn, follower_id).await?;
        notify(&txn, Notification::follow(following_id, follower_id, &name)).await?;

        txn.commit().await.map_err(store_err)?;

        tracing::debug!(follower_id = %follower_id, following_id = %following_id, "User followed");
        Ok(follow)
    }

    async fn unfollow(&self, follower_id: Uuid, following_id: Uuid) -> Result<(), DomainError> {
        let txn = self.begin().await?;

        let removed = follow::Entity::delete_many()
            .filter(follow::Column::FollowerId.eq(follower_id))
            .filter(follow::Column::FollowingId.eq(following_id))
            .exec(&txn)
            .await
            .map_err(store_err)?;

        if removed.rows_affected == 0 {
            return Err(DomainError::Missing("Not following this user".to_string()));
        }

        txn.commit().await.map_err(store_err)?;
        Ok(())
    }

    async fn comment(
        &self,
        user_id: Uuid,
        post_id: Uuid,
        content: String,
    ) -> Result<Comment, DomainError> {
        require_content(&content)?;

        let txn = self.begin().await?;
        find_post(&txn, post_id).await?;

        let comment = Comment::new(post_id, user_id, content);
        comment::Entity::insert(comment::ActiveModel::from(comment.clone()))
            .exec_without_returning(&txn)
            .await
            .map_err(store_err)?;

        increment(&txn, post_id, post::Column::CommentCount).await?;
        txn.commit().await.map_err(store_err)?;

        tracing::debug!(comment_id = %comment.id, post_id = %post_id, "Comment created");
        Ok(comment)
    }

    async fn reply(
        &self,
        user_id: Uuid,
        parent_id: Uuid,
        content: String,
    ) -> Result<Comment, DomainError> {
        require_content(&content)?;

        let txn = self.begin().await?;

        let parent: Comment = comment::Entity::find_by_id(parent_id)
            .one(&txn)
            .await
            .map_err(store_err)?
            .map(Into::into)
            .ok_or_else(|| DomainError::not_found("Comment", parent_id))?;

        let reply = Comment::reply_to(&parent, user_id, content);
        comment::Entity::insert(comment::ActiveModel::from(reply.clone()))
            .exec_without_returning(&txn)
            .await
            .map_err(store_err)?;

        increment(&txn, parent.post_id, post::Column::CommentCount).await?;
        txn.commit().await.map_err(store_err)?;

        tracing::debug!(comment_id = %reply.id, parent_id = ?reply.parent_id, "Reply created");
        Ok(reply)
    }

    async fn share_post(
        &self,
        user_id: Uuid,
        post_id: Uuid,
        content: String,
    ) -> Result<Post, DomainError> {
        let txn = self.begin().await?;
        let original = find_post(&txn, post_id).await?;

        if !original.is_visible_to(Some(user_id)) {
            return Err(DomainError::Forbidden(
                "Cannot share a private post".to_string(),
            ));
        }

        let shared = Post::share_of(user_id, &original, content);
        post::Entity::insert(post::ActiveModel::from(shared.clone()))
            .exec_without_returning(&txn)
            .await
            .map_err(store_err)?;

        increment(&txn, post_id, post::Column::Shares).await?;
        txn.commit().await.map_err(store_err)?;

        tracing::debug!(post_id = %shared.id, original_post_id = %post_id, "Post shared");
        Ok(shared)
    }

    async fn save_post(&self, user_id: Uuid, post_id: Uuid) -> Result<(), DomainError> {
        let txn = self.begin().await?;
        find_post(&txn, post_id).await?;

        saved_post::Entity::insert(saved_post::ActiveModel {
            user_id: sea_orm::Set(user_id),
            post_id: sea_orm::Set(post_id),
            created_at: sea_orm::Set(chrono::Utc::now().into()),
        })
        .exec_without_returning(&txn)
        .await
        .map_err(|e| duplicate(e, "Post already saved"))?;

        increment(&txn, post_id, post::Column::SavedCount).await?;
        txn.commit().await.map_err(store_err)?;

        tracing::debug!(user_id = %user_id, post_id = %post_id, "Post saved");
        Ok(())
    }

    async fn delete_post(&self, user_id: Uuid, post_id: Uuid) -> Result<Post, DomainError> {
        let txn = self.begin().await?;
        let post = find_post(&txn, post_id).await?;

        if post.user_id != user_id {
            return Err(DomainError::Forbidden(
                "Not authorized to delete this post".to_string(),
            ));
        }

        like::Entity::delete_many()
            .filter(like::Column::PostId.eq(post_id))
            .exec(&txn)
            .await
            .map_err(store_err)?;
        comment::Entity::delete_many()
            .filter(comment::Column::PostId.eq(post_id))
            .exec(&txn)
            .await
            .map_err(store_err)?;
        post_tag::Entity::delete_many()
            .filter(post_tag::Column::PostId.eq(post_id))
            .exec(&txn)
            .await
            .map_err(store_err)?;
        saved_post::Entity::delete_many()
            .filter(saved_post::Column::PostId.eq(post_id))
            .exec(&txn)
            .await
            .map_err(store_err)?;
        notification::Entity::delete_many()
            .filter(notification::Column::PostId.eq(post_id))
            .exec(&txn)
            .await
            .map_err(store_err)?;
        post::Entity::delete_by_id(post_id)
            .exec(&txn)
            .await
            .map_err(store_err)?;

        txn.commit().await.map_err(store_err)?;

        tracing::info!(user_id = %user_id, post_id = %post_id, "Post deleted");
        Ok(post)
    }

    async fn followers(&self, user_id: Uuid) -> Result<Vec<Connection>, DomainError> {
        let edges = follow::Entity::find()
            .filter(follow::Column::FollowingId.eq(user_id))
            .order_by_desc(follow::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(store_err)?;

        self.connections(
            edges
                .into_iter()
                .map(|edge| (edge.follower_id, edge.created_at.into()))
                .collect(),
        )
        .await
    }

    async fn following(&self, user_id: Uuid) -> Result<Vec<Connection>, DomainError> {
        let edges = follow::Entity::find()
            .filter(follow::Column::FollowerId.eq(user_id))
            .order_by_desc(follow::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(store_err)?;

        self.connections(
            edges
                .into_iter()
                .map(|edge| (edge.following_id, edge.created_at.into()))
                .collect(),
        )
        .await
    }

    async fn likers(&self, post_id: Uuid) -> Result<Vec<Liker>, DomainError> {
        let likes = like::Entity::find()
            .filter(like::Column::PostId.eq(post_id))
            .order_by_desc(like::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(store_err)?;

        let ids: Vec<Uuid> = likes.iter().map(|l| l.user_id).collect();
        let mut users = loaders::user_summaries(&self.db, &ids).await?;

        Ok(likes
            .into_iter()
            .filter_map(|like| {
                users.remove(&like.user_id).map(|user| Liker {
                    user,
                    liked_at: like.created_at.into(),
                })
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use sea_orm::{ConnectionTrait, PaginatorTrait};

    use mentorhub_core::domain::{NotificationKind, Tag};
    use mentorhub_core::ports::{
        BaseRepository, CommentRepository, NotificationRepository, TagRepository,
    };

    use super::*;
    use crate::database::postgres_repo::{
        PostgresCommentRepository, PostgresNotificationRepository, PostgresPostRepository,
        PostgresTagRepository,
    };
    use crate::database::testing::{file_db, memory_db, seed_post, seed_user};

    async fn stored_post(db: &DbConn, id: Uuid) -> Option<Post> {
        PostgresPostRepository::new(db.clone())
            .find_by_id(id)
            .await
            .unwrap()
    }

    async fn notification_count(db: &DbConn, user_id: Uuid) -> usize {
        PostgresNotificationRepository::new(db.clone())
            .list_for(user_id)
            .await
            .unwrap()
            .len()
    }

    #[tokio::test]
    async fn test_like_twice_conflicts_and_counts_once() {
        let db = memory_db().await;
        let owner = seed_user(&db, "Owner").await;
        let fan = seed_user(&db, "Fan").await;
        let post = seed_post(&db, owner.id, "hello", false).await;
        let engine = PostgresEngagementRepository::new(db.clone());

        engine.like_post(fan.id, post.id).await.unwrap();
        let second = engine.like_post(fan.id, post.id).await;

        assert!(matches!(second, Err(DomainError::Conflict(_))));
        assert_eq!(stored_post(&db, post.id).await.unwrap().analytics.likes, 1);
        assert_eq!(notification_count(&db, owner.id).await, 1);
    }

    #[tokio::test]
    async fn test_like_notifies_owner_but_not_self() {
        let db = memory_db().await;
        let owner = seed_user(&db, "Owner").await;
        let fan = seed_user(&db, "Fan").await;
        let post = seed_post(&db, owner.id, "hello", false).await;
        let engine = PostgresEngagementRepository::new(db.clone());

        engine.like_post(owner.id, post.id).await.unwrap();
        assert_eq!(notification_count(&db, owner.id).await, 0);

        engine.like_post(fan.id, post.id).await.unwrap();
        let notifications = PostgresNotificationRepository::new(db.clone())
            .list_for(owner.id)
            .await
            .unwrap();

        assert_eq!(notifications.len(), 1);
        let first = &notifications[0].notification;
        assert_eq!(first.kind, NotificationKind::Like);
        assert_eq!(first.actor_id, fan.id);
        assert_eq!(first.post_id, Some(post.id));
        assert_eq!(first.message, "Fan liked your post");
    }

    #[tokio::test]
    async fn test_like_missing_post_is_not_found() {
        let db = memory_db().await;
        let user = seed_user(&db, "User").await;
        let engine = PostgresEngagementRepository::new(db);

        assert!(matches!(
            engine.like_post(user.id, Uuid::new_v4()).await,
            Err(DomainError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_unlike_without_like_is_not_found_and_counter_stays_at_zero() {
        let db = memory_db().await;
        let owner = seed_user(&db, "Owner").await;
        let post = seed_post(&db, owner.id, "hello", false).await;
        let engine = PostgresEngagementRepository::new(db.clone());

        assert!(matches!(
            engine.unlike_post(owner.id, post.id).await,
            Err(DomainError::Missing(_))
        ));
        assert_eq!(stored_post(&db, post.id).await.unwrap().analytics.likes, 0);

        engine.like_post(owner.id, post.id).await.unwrap();
        engine.unlike_post(owner.id, post.id).await.unwrap();
        assert_eq!(stored_post(&db, post.id).await.unwrap().analytics.likes, 0);
    }

    #[tokio::test]
    async fn test_increment_waits_for_open_writer_and_adds_to_its_value() {
        let file = file_db(2).await;
        let owner = seed_user(&file.db, "Owner").await;
        let post = seed_post(&file.db, owner.id, "popular", false).await;

        let first = file.db.begin().await.unwrap();
        increment(&first, post.id, post::Column::Likes).await.unwrap();

        let db = file.db.clone();
        let post_id = post.id;
        let second = tokio::spawn(async move {
            let txn = db.begin().await.map_err(store_err)?;
            increment(&txn, post_id, post::Column::Likes).await?;
            txn.commit().await.map_err(store_err)
        });

        // The second writer is now blocked behind the first.
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        first.commit().await.unwrap();

        tokio::time::timeout(std::time::Duration::from_secs(10), second)
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        assert_eq!(stored_post(&file.db, post.id).await.unwrap().analytics.likes, 2);
    }

    #[tokio::test]
    async fn test_concurrent_likes_are_all_counted() {
        let file = file_db(8).await;
        let db = file.db.clone();
        let owner = seed_user(&db, "Owner").await;
        let post = seed_post(&db, owner.id, "popular", false).await;
        let engine = Arc::new(PostgresEngagementRepository::new(db.clone()));

        let mut fans = Vec::new();
        for i in 0..8 {
            fans.push(seed_user(&db, &format!("Fan {i}")).await);
        }

        let post_id = post.id;
        let handles: Vec<_> = fans
            .iter()
            .map(|fan| {
                let engine = engine.clone();
                let fan_id = fan.id;
                tokio::spawn(async move {
                    // SQLite aborts a writer whose snapshot went stale; the
                    // whole transaction is retried.
                    for _ in 0..100 {
                        match engine.like_post(fan_id, post_id).await {
                            Err(DomainError::Internal(_)) => {
                                tokio::time::sleep(std::time::Duration::from_millis(5)).await
                            }
                            other => return other,
                        }
                    }
                    engine.like_post(fan_id, post_id).await
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(stored_post(&db, post.id).await.unwrap().analytics.likes, 8);
        assert_eq!(engine.likers(post.id).await.unwrap().len(), 8);
    }

    #[tokio::test]
    async fn test_self_follow_is_rejected_before_any_write() {
        let db = memory_db().await;
        let user = seed_user(&db, "Narcissus").await;
        let engine = PostgresEngagementRepository::new(db.clone());

        assert!(matches!(
            engine.follow(user.id, user.id).await,
            Err(DomainError::Validation(_))
        ));
        assert_eq!(follow::Entity::find().count(&db).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_follow_unknown_user_is_not_found() {
        let db = memory_db().await;
        let user = seed_user(&db, "User").await;
        let engine = PostgresEngagementRepository::new(db);

        assert!(matches!(
            engine.follow(user.id, Uuid::new_v4()).await,
            Err(DomainError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_follow_twice_conflicts() {
        let db = memory_db().await;
        let a = seed_user(&db, "A").await;
        let b = seed_user(&db, "B").await;
        let engine = PostgresEngagementRepository::new(db.clone());

        engine.follow(a.id, b.id).await.unwrap();
        assert!(matches!(
            engine.follow(a.id, b.id).await,
            Err(DomainError::Conflict(_))
        ));
        assert_eq!(notification_count(&db, b.id).await, 1);

        let followers = engine.followers(b.id).await.unwrap();
        let following = engine.following(a.id).await.unwrap();
        assert_eq!(followers.len(), 1);
        assert_eq!(followers[0].id, a.id);
        assert_eq!(followers[0].name, "A");
        assert_eq!(following[0].id, b.id);
    }

    #[tokio::test]
    async fn test_unfollow_without_follow_is_not_found() {
        let db = memory_db().await;
        let a = seed_user(&db, "A").await;
        let b = seed_user(&db, "B").await;
        let engine = PostgresEngagementRepository::new(db);

        assert!(matches!(
            engine.unfollow(a.id, b.id).await,
            Err(DomainError::Missing(_))
        ));

        engine.follow(a.id, b.id).await.unwrap();
        engine.unfollow(a.id, b.id).await.unwrap();
        assert!(engine.followers(b.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_notification_rolls_back_follow() {
        let db = memory_db().await;
        let a = seed_user(&db, "A").await;
        let b = seed_user(&db, "B").await;
        db.execute_unprepared("DROP TABLE notifications")
            .await
            .unwrap();
        let engine = PostgresEngagementRepository::new(db.clone());

        assert!(engine.follow(a.id, b.id).await.is_err());
        assert_eq!(follow::Entity::find().count(&db).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_comment_and_nested_reply() {
        let db = memory_db().await;
        let owner = seed_user(&db, "Owner").await;
        let reader = seed_user(&db, "Reader").await;
        let post = seed_post(&db, owner.id, "hello", false).await;
        let engine = PostgresEngagementRepository::new(db.clone());

        let root = engine
            .comment(reader.id, post.id, "Nice".to_string())
            .await
            .unwrap();
        let reply = engine
            .reply(owner.id, root.id, "Thanks".to_string())
            .await
            .unwrap();
        let nested = engine
            .reply(reader.id, reply.id, "Welcome".to_string())
            .await
            .unwrap();

        assert_eq!(reply.parent_id, Some(root.id));
        assert_eq!(nested.parent_id, Some(root.id));
        assert_eq!(
            stored_post(&db, post.id).await.unwrap().analytics.comment_count,
            3
        );

        let threads = PostgresCommentRepository::new(db.clone())
            .threads(post.id)
            .await
            .unwrap();
        assert_eq!(threads.len(), 1);
        assert_eq!(threads[0].replies.len(), 2);
        assert_eq!(threads[0].comment.author.as_ref().unwrap().name, "Reader");
    }

    #[tokio::test]
    async fn test_comment_validation_and_missing_targets() {
        let db = memory_db().await;
        let user = seed_user(&db, "User").await;
        let post = seed_post(&db, user.id, "hello", false).await;
        let engine = PostgresEngagementRepository::new(db);

        assert!(matches!(
            engine.comment(user.id, post.id, "   ".to_string()).await,
            Err(DomainError::Validation(_))
        ));
        assert!(matches!(
            engine.comment(user.id, Uuid::new_v4(), "hi".to_string()).await,
            Err(DomainError::NotFound { .. })
        ));
        assert!(matches!(
            engine.reply(user.id, Uuid::new_v4(), "hi".to_string()).await,
            Err(DomainError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_share_and_save_update_counters() {
        let db = memory_db().await;
        let owner = seed_user(&db, "Owner").await;
        let reader = seed_user(&db, "Reader").await;
        let post = seed_post(&db, owner.id, "hello", false).await;
        let engine = PostgresEngagementRepository::new(db.clone());

        let shared = engine
            .share_post(reader.id, post.id, "must read".to_string())
            .await
            .unwrap();
        engine.save_post(reader.id, post.id).await.unwrap();
        let again = engine.save_post(reader.id, post.id).await;

        assert_eq!(shared.original_post_id, Some(post.id));
        assert!(matches!(again, Err(DomainError::Conflict(_))));

        let analytics = stored_post(&db, post.id).await.unwrap().analytics;
        assert_eq!(analytics.shares, 1);
        assert_eq!(analytics.saved_count, 1);
    }

    #[tokio::test]
    async fn test_sharing_someone_elses_private_post_is_forbidden() {
        let db = memory_db().await;
        let owner = seed_user(&db, "Owner").await;
        let reader = seed_user(&db, "Reader").await;
        let post = seed_post(&db, owner.id, "secret", true).await;
        let engine = PostgresEngagementRepository::new(db.clone());

        assert!(matches!(
            engine.share_post(reader.id, post.id, String::new()).await,
            Err(DomainError::Forbidden(_))
        ));
        assert_eq!(stored_post(&db, post.id).await.unwrap().analytics.shares, 0);
    }

    #[tokio::test]
    async fn test_delete_post_cascades() {
        let db = memory_db().await;
        let owner = seed_user(&db, "Owner").await;
        let fan = seed_user(&db, "Fan").await;
        let post = seed_post(&db, owner.id, "bye", false).await;
        let keep = seed_post(&db, owner.id, "stay", false).await;
        let engine = PostgresEngagementRepository::new(db.clone());

        let tags = PostgresTagRepository::new(db.clone());
        let tag = tags.create(Tag::new("farewell", None).unwrap()).await.unwrap();
        tags.attach_to_post(post.id, &[tag.id]).await.unwrap();

        engine.like_post(fan.id, post.id).await.unwrap();
        engine.like_post(fan.id, keep.id).await.unwrap();
        let root = engine
            .comment(fan.id, post.id, "sad".to_string())
            .await
            .unwrap();
        engine
            .reply(owner.id, root.id, "indeed".to_string())
            .await
            .unwrap();
        engine.save_post(fan.id, post.id).await.unwrap();

        let deleted = engine.delete_post(owner.id, post.id).await.unwrap();

        assert_eq!(deleted.id, post.id);
        assert!(stored_post(&db, post.id).await.is_none());
        assert_eq!(
            like::Entity::find()
                .filter(like::Column::PostId.eq(post.id))
                .count(&db)
                .await
                .unwrap(),
            0
        );
        assert_eq!(comment::Entity::find().count(&db).await.unwrap(), 0);
        assert_eq!(post_tag::Entity::find().count(&db).await.unwrap(), 0);
        assert_eq!(saved_post::Entity::find().count(&db).await.unwrap(), 0);
        assert_eq!(
            notification::Entity::find()
                .filter(notification::Column::PostId.eq(post.id))
                .count(&db)
                .await
                .unwrap(),
            0
        );
        // The other post keeps its like and notification.
        assert_eq!(notification_count(&db, owner.id).await, 1);
        assert_eq!(stored_post(&db, keep.id).await.unwrap().analytics.likes, 1);
    }

    #[tokio::test]
    async fn test_only_owner_may_delete() {
        let db = memory_db().await;
        let owner = seed_user(&db, "Owner").await;
        let other = seed_user(&db, "Other").await;
        let post = seed_post(&db, owner.id, "mine", false).await;
        let engine = PostgresEngagementRepository::new(db.clone());

        assert!(matches!(
            engine.delete_post(other.id, post.id).await,
            Err(DomainError::Forbidden(_))
        ));
        assert!(stored_post(&db, post.id).await.is_some());
    }
}
