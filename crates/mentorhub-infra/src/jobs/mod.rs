//! Job queue implementation and job handlers.

mod media_cleanup;
mod memory;

pub use media_cleanup::{MEDIA_CLEANUP_JOB, MediaCleanupPayload, media_cleanup_handler, media_cleanup_job};
pub use memory::{InMemoryJobQueue, InMemoryJobQueueConfig, JobFuture};
