//! Error handling middleware - RFC 7807 compliant responses.

use std::fmt;

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use mentorhub_core::error::{DomainError, RepoError};
use mentorhub_core::ports::{AuthError, MediaError};
use mentorhub_core::services::AuthServiceError;
use mentorhub_shared::ErrorResponse;

/// Application-level error type that converts to RFC 7807 responses.
#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    BadRequest(String),
    Unauthorized(String),
    TokenExpired,
    Forbidden(String),
    /// Duplicate resources are reported as 400.
    Conflict(String),
    TooManyRequests { retry_after_secs: u64 },
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::NotFound(msg) => write!(f, "Not found: {msg}"),
            AppError::BadRequest(msg) => write!(f, "Bad request: {msg}"),
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {msg}"),
            AppError::TokenExpired => write!(f, "Token expired"),
            AppError::Forbidden(msg) => write!(f, "Forbidden: {msg}"),
            AppError::Conflict(msg) => write!(f, "Conflict: {msg}"),
            AppError::TooManyRequests { .. } => write!(f, "Too many requests"),
            AppError::Internal(msg) => write!(f, "Internal error: {msg}"),
        }
    }
}

impl AppError {
    /// Stable machine-readable code carried in every error body.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::NotFound(_) => "not_found",
            AppError::BadRequest(_) => "validation_error",
            AppError::Unauthorized(_) => "unauthorized",
            AppError::TokenExpired => "token_expired",
            AppError::Forbidden(_) => "forbidden",
            AppError::Conflict(_) => "conflict",
            AppError::TooManyRequests { .. } => "rate_limited",
            AppError::Internal(_) => "internal_error",
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) | AppError::Conflict(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) | AppError::TokenExpired => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::TooManyRequests { .. } => StatusCode::TOO_MANY_REQUESTS,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let title = status.canonical_reason().unwrap_or("Error");
        let error = ErrorResponse::new(status.as_u16(), title, self.code());

        let error = match self {
            AppError::NotFound(detail)
            | AppError::BadRequest(detail)
            | AppError::Unauthorized(detail)
            | AppError::Forbidden(detail)
            | AppError::Conflict(detail) => error.with_detail(detail),
            AppError::TokenExpired => {
                error.with_detail("Your authentication token has expired. Please login again.")
            }
            AppError::TooManyRequests { retry_after_secs } => error.with_detail(format!(
                "Rate limit exceeded. Try again in {retry_after_secs} seconds."
            )),
            AppError::Internal(detail) => {
                tracing::error!(error = %detail, "Internal error");
                error
            }
        };

        let mut response = HttpResponse::build(status);
        if let AppError::TooManyRequests { retry_after_secs } = self {
            response
                .insert_header(("Retry-After", retry_after_secs.to_string()))
                .insert_header(("X-RateLimit-Remaining", "0"));
        }
        response.json(error)
    }
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::NotFound { entity_type, .. } => {
                AppError::NotFound(format!("{entity_type} not found"))
            }
            DomainError::Missing(msg) => AppError::NotFound(msg),
            DomainError::Validation(msg) => AppError::BadRequest(msg),
            DomainError::Conflict(msg) => AppError::Conflict(msg),
            DomainError::Unauthorized(msg) => AppError::Unauthorized(msg),
            DomainError::Forbidden(msg) => AppError::Forbidden(msg),
            DomainError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound => AppError::NotFound("Resource not found".to_string()),
            RepoError::Constraint(msg) => AppError::Conflict(msg),
            RepoError::Connection(msg) => {
                tracing::error!(error = %msg, "Database connection error");
                AppError::Internal("Database error".to_string())
            }
            RepoError::Query(msg) => {
                tracing::error!(error = %msg, "Database query error");
                AppError::Internal("Database error".to_string())
            }
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::TokenExpired => AppError::TokenExpired,
            AuthError::MissingAuth => AppError::Unauthorized(
                "Please provide a valid Bearer token in the Authorization header.".to_string(),
            ),
            err if err.is_client_error() => AppError::Unauthorized(err.to_string()),
            err => AppError::Internal(err.to_string()),
        }
    }
}

impl From<AuthServiceError> for AppError {
    fn from(err: AuthServiceError) -> Self {
        match err {
            AuthServiceError::Auth(err) => err.into(),
            AuthServiceError::Domain(err) => err.into(),
        }
    }
}

impl From<MediaError> for AppError {
    fn from(err: MediaError) -> Self {
        match err {
            MediaError::InvalidUrl(msg) => AppError::BadRequest(msg),
            err => AppError::Internal(err.to_string()),
        }
    }
}

/// Result type alias for handlers.
pub type AppResult<T> = Result<T, AppError>;
