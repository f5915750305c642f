//! Application state - shared across all handlers.

use std::sync::Arc;

use mentorhub_core::ports::{
    CommentRepository, EngagementRepository, IdentityVerifier, JobQueue, MediaStorage,
    MentorRepository, NotificationRepository, PasswordService, PostRepository, RateLimiter,
    TagRepository, TokenService, UserRepository,
};
use mentorhub_core::services::AuthService;
use mentorhub_infra::database::{
    PostgresCommentRepository, PostgresMentorRepository, PostgresNotificationRepository,
    PostgresPostRepository, PostgresTagRepository, PostgresUserRepository,
};
use mentorhub_infra::jobs::media_cleanup_handler;
use mentorhub_infra::{
    Argon2PasswordService, CloudinaryStorage, DatabaseConnections, FirebaseVerifier,
    InMemoryJobQueue, InMemoryRateLimiter, JwtTokenService, PostgresEngagementRepository,
    UnconfiguredStorage,
};

use crate::config::AppConfig;

/// Process-wide services that do not live in the database.
#[derive(Clone)]
pub struct Services {
    pub tokens: Arc<dyn TokenService>,
    pub passwords: Arc<dyn PasswordService>,
    pub verifier: Arc<dyn IdentityVerifier>,
    pub media: Arc<dyn MediaStorage>,
    pub jobs: Arc<dyn JobQueue>,
    pub rate_limiter: Arc<dyn RateLimiter>,
}

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("database: {0}")]
    Database(String),

    #[error("token service: {0}")]
    Tokens(String),
}

/// Shared application state. Read-only after startup.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub mentors: Arc<dyn MentorRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub tags: Arc<dyn TagRepository>,
    pub notifications: Arc<dyn NotificationRepository>,
    pub engagement: Arc<dyn EngagementRepository>,
    pub auth: Arc<AuthService>,
    pub tokens: Arc<dyn TokenService>,
    pub media: Arc<dyn MediaStorage>,
    pub jobs: Arc<dyn JobQueue>,
    pub rate_limiter: Arc<dyn RateLimiter>,
}

impl AppState {
    /// Build the repositories over `db` and wire them to `services`.
    pub fn new(db: &DatabaseConnections, services: Services) -> Self {
        let conn = db.main.clone();

        let users: Arc<dyn UserRepository> = Arc::new(PostgresUserRepository::new(conn.clone()));
        let mentors: Arc<dyn MentorRepository> =
            Arc::new(PostgresMentorRepository::new(conn.clone()));

        let auth = Arc::new(AuthService::new(
            services.tokens.clone(),
            services.passwords,
            services.verifier,
            users.clone(),
            mentors.clone(),
        ));

        Self {
            users,
            mentors,
            posts: Arc::new(PostgresPostRepository::new(conn.clone())),
            comments: Arc::new(PostgresCommentRepository::new(conn.clone())),
            tags: Arc::new(PostgresTagRepository::new(conn.clone())),
            notifications: Arc::new(PostgresNotificationRepository::new(conn.clone())),
            engagement: Arc::new(PostgresEngagementRepository::new(conn)),
            auth,
            tokens: services.tokens,
            media: services.media,
            jobs: services.jobs,
            rate_limiter: services.rate_limiter,
        }
    }

    /// Connect to the database, build every service described by `config`
    /// and start the media cleanup workers.
    pub async fn from_config(config: &AppConfig) -> Result<Self, StartupError> {
        let db = DatabaseConnections::init(&config.database)
            .await
            .map_err(|e| StartupError::Database(e.to_string()))?;

        let tokens = JwtTokenService::new(config.jwt.clone())
            .map_err(|e| StartupError::Tokens(e.to_string()))?;

        let media: Arc<dyn MediaStorage> = match &config.cloudinary {
            Some(cloudinary) => Arc::new(CloudinaryStorage::new(cloudinary.clone())),
            None => {
                tracing::warn!("CLOUDINARY_URL not set. Uploads will fail.");
                Arc::new(UnconfiguredStorage)
            }
        };

        let jobs = InMemoryJobQueue::new(config.job_queue.clone());
        jobs.start_worker(media_cleanup_handler(media.clone()));

        let services = Services {
            tokens: Arc::new(tokens),
            passwords: Arc::new(Argon2PasswordService::new()),
            verifier: Arc::new(FirebaseVerifier::new(config.firebase.clone())),
            media,
            jobs: Arc::new(jobs),
            rate_limiter: Arc::new(InMemoryRateLimiter::new(config.rate_limit.clone())),
        };

        tracing::info!("Application state initialized");
        Ok(Self::new(&db, services))
    }
}
