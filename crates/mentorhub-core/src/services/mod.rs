//! Application services - use cases composed from ports.

mod auth;

pub use auth::{AuthService, AuthServiceError, AuthSession, Registration, MIN_PASSWORD_LEN};
