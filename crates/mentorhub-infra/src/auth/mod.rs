//! Session tokens and password hashing.

mod jwt;
mod password;

pub use jwt::{ACCESS_TOKEN_TTL, Clock, JwtConfig, JwtTokenService, REFRESH_TOKEN_TTL};
pub use password::Argon2PasswordService;
