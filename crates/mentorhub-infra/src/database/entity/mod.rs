//! SeaORM entities.

pub mod comment;
pub mod follow;
pub mod json;
pub mod like;
pub mod mentor_profile;
pub mod mentor_tag;
pub mod notification;
pub mod post;
pub mod post_tag;
pub mod saved_post;
pub mod tag;
pub mod user;
pub mod user_tag;
