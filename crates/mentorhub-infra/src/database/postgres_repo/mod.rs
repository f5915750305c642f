//! SeaORM repository implementations.

mod comment;
mod mentor;
mod notification;
mod post;
mod tag;
mod user;

pub use comment::PostgresCommentRepository;
pub use mentor::PostgresMentorRepository;
pub use notification::PostgresNotificationRepository;
pub use post::PostgresPostRepository;
pub use tag::PostgresTagRepository;
pub use user::PostgresUserRepository;
pub(crate) use user::mask_email;
