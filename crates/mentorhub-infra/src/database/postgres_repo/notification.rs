use async_trait::async_trait;
use chrono::Utc;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

use mentorhub_core::domain::{Notification, NotificationView};
use mentorhub_core::error::RepoError;
use mentorhub_core::ports::NotificationRepository;

use crate::database::entity::notification::{self, Entity as NotificationEntity};
use crate::database::error::map_db_err;
use crate::database::loaders;
use crate::database::postgres_base::PostgresBaseRepository;

/// Notification repository.
pub type PostgresNotificationRepository = PostgresBaseRepository<NotificationEntity>;

impl PostgresNotificationRepository {
    async fn mark(&self, condition: sea_orm::Condition) -> Result<u64, RepoError> {
        let now: DateTimeWithTimeZone = Utc::now().into();
        let result = NotificationEntity::update_many()
            .col_expr(notification::Column::IsRead, Expr::value(true))
            .col_expr(notification::Column::UpdatedAt, Expr::value(now))
            .filter(condition)
            .exec(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.rows_affected)
    }
}

#[async_trait]
impl NotificationRepository for PostgresNotificationRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Notification>, RepoError> {
        NotificationEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(map_db_err)?
            .map(Notification::try_from)
            .transpose()
    }

    async fn list_for(&self, user_id: Uuid) -> Result<Vec<NotificationView>, RepoError> {
        let notifications = NotificationEntity::find()
            .filter(notification::Column::UserId.eq(user_id))
            .order_by_desc(notification::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(map_db_err)?
            .into_iter()
            .map(Notification::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        let actor_ids: Vec<Uuid> = notifications.iter().map(|n| n.actor_id).collect();
        let actors = loaders::user_summaries(&self.db, &actor_ids).await?;

        Ok(notifications
            .into_iter()
            .map(|notification| NotificationView {
                actor: actors.get(&notification.actor_id).cloned(),
                notification,
            })
            .collect())
    }

    async fn mark_read(&self, id: Uuid) -> Result<(), RepoError> {
        let updated = self
            .mark(sea_orm::Condition::all().add(notification::Column::Id.eq(id)))
            .await?;

        if updated == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }

    async fn mark_all_read(&self, user_id: Uuid) -> Result<u64, RepoError> {
        self.mark(
            sea_orm::Condition::all()
                .add(notification::Column::UserId.eq(user_id))
                .add(notification::Column::IsRead.eq(false)),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use mentorhub_core::domain::NotificationKind;
    use mentorhub_core::ports::EngagementRepository;

    use super::*;
    use crate::database::PostgresEngagementRepository;
    use crate::database::testing::{memory_db, seed_user};

    #[tokio::test]
    async fn test_follow_notifications_are_listed_and_marked_read() {
        let db = memory_db().await;
        let target = seed_user(&db, "Target").await;
        let first = seed_user(&db, "First").await;
        let second = seed_user(&db, "Second").await;

        let engagement = PostgresEngagementRepository::new(db.clone());
        engagement.follow(first.id, target.id).await.unwrap();
        engagement.follow(second.id, target.id).await.unwrap();

        let repo = PostgresNotificationRepository::new(db);
        let listed = repo.list_for(target.id).await.unwrap();

        assert_eq!(listed.len(), 2);
        assert!(listed.iter().all(|n| n.notification.kind == NotificationKind::Follow));
        assert!(listed.iter().all(|n| n.actor.is_some()));
        assert_eq!(listed[0].notification.message, "Second started following you");

        repo.mark_read(listed[0].notification.id).await.unwrap();
        assert_eq!(repo.mark_all_read(target.id).await.unwrap(), 1);
        assert_eq!(repo.mark_all_read(target.id).await.unwrap(), 0);

        let stored = repo.find_by_id(listed[1].notification.id).await.unwrap().unwrap();
        assert!(stored.is_read);
        assert!(matches!(
            repo.mark_read(Uuid::new_v4()).await,
            Err(RepoError::NotFound)
        ));
    }
}
