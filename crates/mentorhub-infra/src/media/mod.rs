//! Object storage for user-uploaded media.

mod cloudinary;

pub use cloudinary::{CloudinaryConfig, CloudinaryStorage, UnconfiguredStorage, public_id_from_url};
