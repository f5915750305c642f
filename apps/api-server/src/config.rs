//! Application configuration loaded from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use mentorhub_infra::{
    CloudinaryConfig, DatabaseConfig, FirebaseConfig, InMemoryJobQueueConfig, JwtConfig,
    RateLimitConfig,
};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has an invalid value '{value}'")]
    Invalid { name: &'static str, value: String },

    #[error("CLOUDINARY_URL is malformed: {0}")]
    Cloudinary(String),
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub firebase: FirebaseConfig,
    /// Uploads fail when absent.
    pub cloudinary: Option<CloudinaryConfig>,
    pub rate_limit: RateLimitConfig,
    pub job_queue: InMemoryJobQueueConfig,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let database = DatabaseConfig {
            url: required("DATABASE_URL")?,
            max_connections: parsed("DB_MAX_CONNECTIONS", 100)?,
            min_connections: parsed("DB_MIN_CONNECTIONS", 10)?,
        };

        let jwt = JwtConfig::new(
            required("JWT_SECRET_KEY")?,
            env::var("JWT_ISSUER").unwrap_or_else(|_| "mentorhub-api".to_string()),
        );

        let cloudinary = match env::var("CLOUDINARY_URL") {
            Ok(url) if !url.trim().is_empty() => Some(
                CloudinaryConfig::from_url(url.trim())
                    .map_err(|e| ConfigError::Cloudinary(e.to_string()))?,
            ),
            _ => None,
        };

        let job_defaults = InMemoryJobQueueConfig::default();

        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parsed("PORT", 8080)?,
            database,
            jwt,
            firebase: FirebaseConfig::new(required("FIREBASE_PROJECT_ID")?),
            cloudinary,
            rate_limit: RateLimitConfig {
                max_requests: parsed("RATE_LIMIT_MAX_REQUESTS", 20)?,
                window: Duration::from_secs(parsed("RATE_LIMIT_WINDOW_SECS", 60)?),
            },
            job_queue: InMemoryJobQueueConfig {
                max_size: parsed("JOB_QUEUE_MAX_SIZE", job_defaults.max_size)?,
                workers: parsed("JOB_QUEUE_WORKERS", job_defaults.workers)?,
                dead_letter_capacity: parsed(
                    "JOB_DEAD_LETTER_CAPACITY",
                    job_defaults.dead_letter_capacity,
                )?,
                ..job_defaults
            },
        })
    }
}

/// Set and non-blank.
fn required(name: &'static str) -> Result<String, ConfigError> {
    env::var(name)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .ok_or(ConfigError::Missing(name))
}

/// Unset falls back to `default`; a set but unparseable value is an error.
fn parsed<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        Err(_) => Ok(default),
    }
}
