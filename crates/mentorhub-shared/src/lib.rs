//! # MentorHub Shared
//!
//! Request and response bodies of the HTTP API, free of server-side
//! dependencies so clients can reuse them.

pub mod dto;
pub mod response;

pub use response::ErrorResponse;
