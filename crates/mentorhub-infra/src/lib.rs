//! # MentorHub Infrastructure
//!
//! Concrete implementations of the ports defined in `mentorhub-core`:
//! the SeaORM store and engagement engine, session tokens, Firebase identity
//! verification, Cloudinary media storage, the in-memory job queue and rate
//! limiting.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - No external services, in-memory only
//! - `postgres` - Relational store via SeaORM
//! - `auth` - JWT + Argon2 authentication
//! - `firebase` - Firebase ID token verification
//! - `media` - Cloudinary uploads
//! - `rate-limit` - Rate limiting via governor

pub mod jobs;

#[cfg(feature = "postgres")]
pub mod database;

#[cfg(feature = "auth")]
pub mod auth;

#[cfg(feature = "firebase")]
pub mod identity;

#[cfg(feature = "media")]
pub mod media;

#[cfg(feature = "rate-limit")]
pub mod rate_limit;

pub use jobs::{InMemoryJobQueue, InMemoryJobQueueConfig};

#[cfg(feature = "postgres")]
pub use database::{DatabaseConfig, DatabaseConnections, PostgresEngagementRepository};

#[cfg(feature = "auth")]
pub use auth::{Argon2PasswordService, JwtConfig, JwtTokenService};

#[cfg(feature = "firebase")]
pub use identity::{FirebaseConfig, FirebaseVerifier};

#[cfg(feature = "media")]
pub use media::{CloudinaryConfig, CloudinaryStorage, UnconfiguredStorage};

#[cfg(feature = "rate-limit")]
pub use rate_limit::{InMemoryRateLimiter, RateLimitConfig};
