//! # MentorHub Core
//!
//! The domain layer of the MentorHub backend.
//! This crate contains the entities, the ports infrastructure must implement,
//! and the authentication flows built on top of those ports. It has no
//! infrastructure dependencies.

pub mod domain;
pub mod error;
pub mod ports;
pub mod services;

pub use error::{DomainError, RepoError};
