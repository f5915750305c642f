//! Background job port - detached work with its own failure channel.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A job that can be queued and processed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    /// Unique job identifier.
    pub id: String,
    /// Job type/name for routing to handlers.
    pub job_type: String,
    /// Serialized payload.
    pub payload: serde_json::Value,
    /// Number of processing attempts so far.
    pub attempts: u32,
    /// Attempts allowed before the job is dead-lettered.
    pub max_attempts: u32,
    /// When the job was created.
    pub created_at: chrono::DateTime<chrono::Utc>,
    /// Reason of the most recent failure.
    pub last_error: Option<String>,
}

impl Job {
    pub fn new(job_type: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            job_type: job_type.into(),
            payload,
            attempts: 0,
            max_attempts: 3,
            created_at: chrono::Utc::now(),
            last_error: None,
        }
    }

    pub fn with_max_attempts(mut self, max: u32) -> Self {
        self.max_attempts = max.max(1);
        self
    }
}

/// Result of job processing.
#[derive(Debug)]
pub enum JobResult {
    /// Job completed successfully.
    Success,
    /// Job failed, should be retried.
    Retry(String),
    /// Job failed permanently, should not be retried.
    Failed(String),
}

/// Job queue trait - abstraction over job queue backends.
#[async_trait]
pub trait JobQueue: Send + Sync {
    /// Enqueue a job for processing. Never waits for the job to run.
    async fn enqueue(&self, job: Job) -> Result<(), JobQueueError>;

    /// Get queue statistics.
    async fn stats(&self) -> Result<QueueStats, JobQueueError>;

    /// Jobs that exhausted their attempts or failed permanently.
    async fn dead_letters(&self) -> Vec<Job>;
}

/// Queue statistics.
#[derive(Debug, Clone, Default)]
pub struct QueueStats {
    pub pending: usize,
    pub processing: usize,
    pub completed: usize,
    pub failed: usize,
}

/// Job queue errors.
#[derive(Debug, thiserror::Error)]
pub enum JobQueueError {
    #[error("Failed to enqueue job: {0}")]
    EnqueueError(String),

    #[error("Queue is full")]
    QueueFull,
}
