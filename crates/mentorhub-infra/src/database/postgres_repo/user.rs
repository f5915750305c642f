use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::sea_query::{Expr, SimpleExpr};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use uuid::Uuid;

use mentorhub_core::domain::{ProfileUpdate, User, UserSummary};
use mentorhub_core::error::RepoError;
use mentorhub_core::ports::{BaseRepository, UserRepository};

use crate::database::entity::user::{self, Entity as UserEntity};
use crate::database::error::map_db_err;
use crate::database::loaders;
use crate::database::postgres_base::PostgresBaseRepository;

/// User repository.
pub type PostgresUserRepository = PostgresBaseRepository<UserEntity>;

/// `grace@example.com` becomes `g***@example.com`.
pub(crate) fn mask_email(email: &str) -> String {
    match email.split_once('@') {
        Some((local, domain)) if local.chars().count() > 1 => {
            let first: String = local.chars().take(1).collect();
            format!("{first}***@{domain}")
        }
        Some((_, domain)) => format!("***@{domain}"),
        None => "***".to_string(),
    }
}

impl PostgresUserRepository {
    /// Set `columns` on one row and bump `updated_at`.
    async fn touch(
        &self,
        id: Uuid,
        columns: Vec<(user::Column, SimpleExpr)>,
    ) -> Result<(), RepoError> {
        let now: DateTimeWithTimeZone = Utc::now().into();
        let update = columns
            .into_iter()
            .fold(UserEntity::update_many(), |update, (column, value)| {
                update.col_expr(column, value)
            });

        let result = update
            .col_expr(user::Column::UpdatedAt, Expr::value(now))
            .filter(user::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(map_db_err)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_external_id(&self, external_id: &str) -> Result<Option<User>, RepoError> {
        let result = UserEntity::find()
            .filter(user::Column::ExternalId.eq(external_id))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        tracing::debug!(user_email = %mask_email(email), "Finding user by email");

        let result = UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }

    async fn record_login(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), RepoError> {
        let at: DateTimeWithTimeZone = at.into();
        self.touch(id, vec![(user::Column::LastLoginAt, Expr::value(at))])
            .await
    }

    async fn set_password_hash(&self, id: Uuid, hash: &str) -> Result<(), RepoError> {
        self.touch(
            id,
            vec![(user::Column::PasswordHash, Expr::value(hash.to_string()))],
        )
        .await
    }

    async fn update_profile(&self, id: Uuid, update: ProfileUpdate) -> Result<User, RepoError> {
        let mut columns = vec![
            (user::Column::Bio, Expr::value(update.bio)),
            (user::Column::AvatarUrl, Expr::value(update.avatar_url)),
            (user::Column::IsPrivate, Expr::value(update.is_private)),
        ];
        if let Some(name) = update.name.filter(|n| !n.trim().is_empty()) {
            columns.push((user::Column::Name, Expr::value(name)));
        }

        self.touch(id, columns).await?;
        self.find_by_id(id).await?.ok_or(RepoError::NotFound)
    }

    async fn deactivate(&self, id: Uuid) -> Result<(), RepoError> {
        let now: DateTimeWithTimeZone = Utc::now().into();
        self.touch(
            id,
            vec![
                (user::Column::IsActive, Expr::value(false)),
                (user::Column::DeletedAt, Expr::value(now)),
            ],
        )
        .await?;

        tracing::info!(user_id = %id, "User deactivated");
        Ok(())
    }

    async fn summaries(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, UserSummary>, RepoError> {
        loaders::user_summaries(&self.db, ids).await
    }
}

#[cfg(test)]
mod tests {
    use mentorhub_core::ports::BaseRepository;

    use super::*;
    use crate::database::testing::memory_db;

    #[test]
    fn test_mask_email() {
        assert_eq!(mask_email("grace@example.com"), "g***@example.com");
        assert_eq!(mask_email("g@example.com"), "***@example.com");
        assert_eq!(mask_email("not-an-email"), "***");
    }

    #[tokio::test]
    async fn test_insert_and_find() {
        let repo = PostgresUserRepository::new(memory_db().await);
        let mut user = User::new("Grace").with_email("grace@example.com");
        user.external_id = Some("uid-1".to_string());
        repo.insert(user.clone()).await.unwrap();

        let by_email = repo.find_by_email("grace@example.com").await.unwrap().unwrap();
        let by_subject = repo.find_by_external_id("uid-1").await.unwrap().unwrap();

        assert_eq!(by_email.id, user.id);
        assert_eq!(by_subject.id, user.id);
        assert!(repo.find_by_email("nobody@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_is_a_constraint_violation() {
        let repo = PostgresUserRepository::new(memory_db().await);
        repo.insert(User::new("A").with_email("dup@example.com"))
            .await
            .unwrap();

        let result = repo.insert(User::new("B").with_email("dup@example.com")).await;
        assert!(matches!(result, Err(RepoError::Constraint(_))));
    }

    #[tokio::test]
    async fn test_record_login_and_deactivate() {
        let repo = PostgresUserRepository::new(memory_db().await);
        let user = repo.insert(User::new("Ada")).await.unwrap();

        repo.record_login(user.id, Utc::now()).await.unwrap();
        repo.deactivate(user.id).await.unwrap();

        let stored: User = repo.find_by_id(user.id).await.unwrap().unwrap();
        assert!(stored.last_login_at.is_some());
        assert!(!stored.is_active);
        assert!(stored.deleted_at.is_some());

        assert!(matches!(
            repo.record_login(Uuid::new_v4(), Utc::now()).await,
            Err(RepoError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_update_profile_leaves_other_columns_alone() {
        let repo = PostgresUserRepository::new(memory_db().await);
        let user = repo
            .insert(User::new("Ada").with_password_hash("old-hash"))
            .await
            .unwrap();

        // Written after the caller loaded its copy of the row.
        repo.set_password_hash(user.id, "new-hash").await.unwrap();
        repo.deactivate(user.id).await.unwrap();

        let updated = repo
            .update_profile(
                user.id,
                ProfileUpdate {
                    name: Some("  ".to_string()),
                    bio: "Engines".to_string(),
                    avatar_url: Some("https://img.example.com/ada.png".to_string()),
                    is_private: true,
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.name, "Ada");
        assert_eq!(updated.bio, "Engines");
        assert!(updated.is_private);
        assert_eq!(updated.password_hash.as_deref(), Some("new-hash"));
        assert!(!updated.is_active);

        assert!(matches!(
            repo.update_profile(Uuid::new_v4(), ProfileUpdate::default()).await,
            Err(RepoError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_update_overwrites_profile() {
        let repo = PostgresUserRepository::new(memory_db().await);
        let mut user = repo.insert(User::new("Ada")).await.unwrap();

        user.bio = "Engines".to_string();
        user.is_private = true;
        repo.update(user.clone()).await.unwrap();

        let stored: User = repo.find_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(stored.bio, "Engines");
        assert!(stored.is_private);
    }
}
