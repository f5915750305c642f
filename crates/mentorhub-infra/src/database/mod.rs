//! Relational store: SeaORM entities, repositories and the engagement engine.

mod connections;
mod engagement;
mod error;
mod loaders;
mod postgres_base;
mod postgres_repo;

pub mod entity;
pub mod schema;

#[cfg(test)]
mod testing;

pub use connections::{DatabaseConfig, DatabaseConnections};
pub use engagement::PostgresEngagementRepository;
pub use postgres_base::PostgresBaseRepository;
pub use postgres_repo::{
    PostgresCommentRepository, PostgresMentorRepository, PostgresNotificationRepository,
    PostgresPostRepository, PostgresTagRepository, PostgresUserRepository,
};
