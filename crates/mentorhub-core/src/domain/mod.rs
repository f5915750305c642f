//! Domain entities - the core business objects.

mod comment;
mod mentor;
mod notification;
mod post;
mod social;
mod tag;
mod user;

pub use comment::{Comment, CommentThread, CommentView};
pub use mentor::{Availability, MentorDetails, MentorFilter, MentorProfile};
pub use notification::{Notification, NotificationKind, NotificationView};
pub use post::{Post, PostAnalytics, PostDetails, PostFilter};
pub use social::{Connection, Follow, Like, Liker};
pub use tag::Tag;
pub use user::{ProfileUpdate, Role, User, UserSummary, normalize_email};
