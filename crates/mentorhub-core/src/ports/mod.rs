//! Ports - trait definitions for external dependencies.
//! These are the "interfaces" that infrastructure must implement.

mod auth;
mod engagement;
mod identity;
mod job_queue;
mod media;
mod rate_limit;
mod repository;

pub use auth::{AuthError, PasswordService, TokenClaims, TokenKind, TokenPair, TokenService};
pub use engagement::EngagementRepository;
pub use identity::{ExternalIdentity, IdentityVerifier};
pub use job_queue::{Job, JobQueue, JobQueueError, JobResult, QueueStats};
pub use media::{MediaError, MediaStorage, MediaUpload};
pub use rate_limit::{RateLimitResult, RateLimiter};
pub use repository::{
    BaseRepository, CommentRepository, MentorRepository, NotificationRepository, PostRepository,
    TagRepository, UserRepository,
};
