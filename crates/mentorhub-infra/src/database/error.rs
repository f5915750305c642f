//! Mapping of SeaORM errors onto repository errors.

use sea_orm::{DbErr, SqlErr};

use mentorhub_core::error::RepoError;

/// Unique and foreign key violations become [`RepoError::Constraint`]; this
/// is how duplicate likes, follows and saves surface.
pub(crate) fn map_db_err(err: DbErr) -> RepoError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(msg))
        | Some(SqlErr::ForeignKeyConstraintViolation(msg)) => return RepoError::Constraint(msg),
        _ => {}
    }

    match err {
        DbErr::RecordNotFound(_) | DbErr::RecordNotUpdated => RepoError::NotFound,
        DbErr::Conn(_) | DbErr::ConnectionAcquire(_) => RepoError::Connection(err.to_string()),
        other => RepoError::Query(other.to_string()),
    }
}
