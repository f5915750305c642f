//! # MentorHub API Server
//!
//! Actix-web HTTP surface of the MentorHub backend.

pub mod config;
pub mod handlers;
pub mod middleware;
pub mod observability;
pub mod state;
pub mod telemetry;
