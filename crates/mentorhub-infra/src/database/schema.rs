//! Schema creation from the entity definitions.
//!
//! Shared by the migration binary and by tests running against SQLite.

use sea_orm::sea_query::{Index, IndexCreateStatement, Table};
use sea_orm::{ConnectionTrait, DbErr, EntityName, EntityTrait, Schema};

use super::entity::{
    comment, follow, like, mentor_profile, mentor_tag, notification, post, post_tag, saved_post,
    tag, user, user_tag,
};

/// Create every table and secondary index that does not exist yet.
/// Tables are created parents first.
pub async fn create_all<C>(db: &C) -> Result<(), DbErr>
where
    C: ConnectionTrait,
{
    let schema = Schema::new(db.get_database_backend());

    create_table(db, &schema, user::Entity).await?;
    create_table(db, &schema, tag::Entity).await?;
    create_table(db, &schema, mentor_profile::Entity).await?;
    create_table(db, &schema, post::Entity).await?;
    create_table(db, &schema, comment::Entity).await?;
    create_table(db, &schema, like::Entity).await?;
    create_table(db, &schema, follow::Entity).await?;
    create_table(db, &schema, saved_post::Entity).await?;
    create_table(db, &schema, notification::Entity).await?;
    create_table(db, &schema, post_tag::Entity).await?;
    create_table(db, &schema, user_tag::Entity).await?;
    create_table(db, &schema, mentor_tag::Entity).await?;

    for index in indexes() {
        db.execute(db.get_database_backend().build(&index)).await?;
    }

    Ok(())
}

/// Drop every table, children first.
pub async fn drop_all<C>(db: &C) -> Result<(), DbErr>
where
    C: ConnectionTrait,
{
    let backend = db.get_database_backend();
    let tables = [
        mentor_tag::Entity.table_ref(),
        user_tag::Entity.table_ref(),
        post_tag::Entity.table_ref(),
        notification::Entity.table_ref(),
        saved_post::Entity.table_ref(),
        follow::Entity.table_ref(),
        like::Entity.table_ref(),
        comment::Entity.table_ref(),
        post::Entity.table_ref(),
        mentor_profile::Entity.table_ref(),
        tag::Entity.table_ref(),
        user::Entity.table_ref(),
    ];

    for table in tables {
        let stmt = Table::drop().table(table).if_exists().to_owned();
        db.execute(backend.build(&stmt)).await?;
    }

    Ok(())
}

async fn create_table<C, E>(db: &C, schema: &Schema, entity: E) -> Result<(), DbErr>
where
    C: ConnectionTrait,
    E: EntityTrait,
{
    let mut stmt = schema.create_table_from_entity(entity);
    stmt.if_not_exists();
    db.execute(db.get_database_backend().build(&stmt)).await?;
    Ok(())
}

fn indexes() -> Vec<IndexCreateStatement> {
    vec![
        Index::create()
            .name("idx_posts_user_id")
            .table(post::Entity)
            .col(post::Column::UserId)
            .if_not_exists()
            .to_owned(),
        Index::create()
            .name("idx_posts_created_at")
            .table(post::Entity)
            .col(post::Column::CreatedAt)
            .if_not_exists()
            .to_owned(),
        Index::create()
            .name("idx_comments_post_id")
            .table(comment::Entity)
            .col(comment::Column::PostId)
            .if_not_exists()
            .to_owned(),
        Index::create()
            .name("idx_likes_post_id")
            .table(like::Entity)
            .col(like::Column::PostId)
            .if_not_exists()
            .to_owned(),
        Index::create()
            .name("idx_follows_following_id")
            .table(follow::Entity)
            .col(follow::Column::FollowingId)
            .if_not_exists()
            .to_owned(),
        Index::create()
            .name("idx_notifications_user_id")
            .table(notification::Entity)
            .col(notification::Column::UserId)
            .if_not_exists()
            .to_owned(),
    ]
}
