//! SQLite fixtures shared by the repository tests.

use std::path::PathBuf;

use sea_orm::{ConnectOptions, ConnectionTrait, Database, DbConn};
use uuid::Uuid;

use mentorhub_core::domain::{Post, User};
use mentorhub_core::ports::BaseRepository;

use super::postgres_repo::{PostgresPostRepository, PostgresUserRepository};
use super::schema;

/// A fresh in-memory database with the full schema. A single connection
/// keeps every query on the same database.
pub(crate) async fn memory_db() -> DbConn {
    let opts = ConnectOptions::new("sqlite::memory:")
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false)
        .to_owned();

    let db = Database::connect(opts).await.unwrap();
    schema::create_all(&db).await.unwrap();
    db
}

/// A temp-file database shared by a pool of several connections, so
/// transactions from different tasks really overlap. Deleted on drop.
pub(crate) struct FileDb {
    pub db: DbConn,
    path: PathBuf,
}

impl Drop for FileDb {
    fn drop(&mut self) {
        for suffix in ["", "-wal", "-shm"] {
            let mut file = self.path.clone().into_os_string();
            file.push(suffix);
            let _ = std::fs::remove_file(file);
        }
    }
}

pub(crate) async fn file_db(connections: u32) -> FileDb {
    let path = std::env::temp_dir().join(format!("mentorhub-{}.db", Uuid::new_v4()));
    let opts = ConnectOptions::new(format!("sqlite://{}?mode=rwc", path.display()))
        .max_connections(connections)
        .sqlx_logging(false)
        .to_owned();

    let db = Database::connect(opts).await.unwrap();
    db.execute_unprepared("PRAGMA journal_mode=WAL").await.unwrap();
    schema::create_all(&db).await.unwrap();
    FileDb { db, path }
}

pub(crate) async fn seed_user(db: &DbConn, name: &str) -> User {
    PostgresUserRepository::new(db.clone())
        .insert(User::new(name))
        .await
        .unwrap()
}

pub(crate) async fn seed_post(db: &DbConn, owner: Uuid, content: &str, private: bool) -> Post {
    PostgresPostRepository::new(db.clone())
        .insert(Post::new(owner, content.to_string(), vec![], private))
        .await
        .unwrap()
}
