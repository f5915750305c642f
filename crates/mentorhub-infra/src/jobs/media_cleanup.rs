//! Deletes the stored media of removed posts.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use mentorhub_core::ports::{Job, JobResult, MediaError, MediaStorage};

use super::memory::JobFuture;

pub const MEDIA_CLEANUP_JOB: &str = "media.cleanup";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaCleanupPayload {
    pub urls: Vec<String>,
}

pub fn media_cleanup_job(urls: Vec<String>) -> Job {
    Job::new(MEDIA_CLEANUP_JOB, serde_json::json!({ "urls": urls }))
}

/// Build the worker handler. Unparseable URLs are skipped, transport
/// failures are retried, anything else fails the job.
pub fn media_cleanup_handler(
    storage: Arc<dyn MediaStorage>,
) -> impl Fn(Job) -> JobFuture + Send + Sync + 'static {
    move |job: Job| {
        let storage = storage.clone();
        Box::pin(async move {
            if job.job_type != MEDIA_CLEANUP_JOB {
                return JobResult::Failed(format!("unknown job type '{}'", job.job_type));
            }

            let payload: MediaCleanupPayload = match serde_json::from_value(job.payload) {
                Ok(payload) => payload,
                Err(e) => return JobResult::Failed(format!("invalid payload: {e}")),
            };

            let mut retryable = Vec::new();
            for url in payload.urls.iter().filter(|u| !u.trim().is_empty()) {
                match storage.delete(url).await {
                    Ok(()) => {}
                    Err(MediaError::InvalidUrl(_)) => {
                        tracing::warn!(job_id = %job.id, url = %url, "Skipping unrecognised media URL");
                    }
                    Err(MediaError::Request(e)) => retryable.push(format!("{url}: {e}")),
                    Err(e) => return JobResult::Failed(format!("{url}: {e}")),
                }
            }

            if retryable.is_empty() {
                JobResult::Success
            } else {
                JobResult::Retry(retryable.join("; "))
            }
        }) as JobFuture
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;
    use mentorhub_core::ports::{JobQueue, MediaUpload};

    use super::*;
    use crate::jobs::{InMemoryJobQueue, InMemoryJobQueueConfig};

    #[derive(Default)]
    struct RecordingStorage {
        deleted: Mutex<Vec<String>>,
        offline: bool,
    }

    #[async_trait]
    impl MediaStorage for RecordingStorage {
        async fn upload(&self, _upload: MediaUpload) -> Result<String, MediaError> {
            Err(MediaError::NotConfigured)
        }

        async fn delete(&self, url: &str) -> Result<(), MediaError> {
            if self.offline {
                return Err(MediaError::Request("connection refused".to_string()));
            }
            if !url.starts_with("https://") {
                return Err(MediaError::InvalidUrl(url.to_string()));
            }
            self.deleted.lock().unwrap().push(url.to_string());
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_deletes_every_url_and_skips_invalid_ones() {
        let storage = Arc::new(RecordingStorage::default());
        let handler = media_cleanup_handler(storage.clone());

        let job = media_cleanup_job(vec![
            "https://cdn.example.com/a.jpg".to_string(),
            "garbage".to_string(),
            String::new(),
            "https://cdn.example.com/b.jpg".to_string(),
        ]);
        let result = handler(job).await;

        assert!(matches!(result, JobResult::Success));
        assert_eq!(storage.deleted.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_transport_failure_is_retried() {
        let storage = Arc::new(RecordingStorage {
            offline: true,
            ..Default::default()
        });
        let handler = media_cleanup_handler(storage);

        let result = handler(media_cleanup_job(vec!["https://cdn.example.com/a.jpg".into()])).await;
        assert!(matches!(result, JobResult::Retry(_)));
    }

    #[tokio::test]
    async fn test_bad_payload_fails_permanently() {
        let handler = media_cleanup_handler(Arc::new(RecordingStorage::default()));
        let job = Job::new(MEDIA_CLEANUP_JOB, serde_json::json!({ "urls": 7 }));

        assert!(matches!(handler(job).await, JobResult::Failed(_)));
    }

    #[tokio::test]
    async fn test_unreachable_storage_ends_in_dead_letters() {
        let queue = InMemoryJobQueue::new(InMemoryJobQueueConfig {
            max_size: 8,
            workers: 1,
            retry_backoff: Duration::from_millis(5),
            ..Default::default()
        });
        queue.start_worker(media_cleanup_handler(Arc::new(RecordingStorage {
            offline: true,
            ..Default::default()
        })));

        let job = media_cleanup_job(vec!["https://cdn.example.com/a.jpg".into()]);
        queue.enqueue(job).await.unwrap();

        let mut dead = Vec::new();
        for _ in 0..200 {
            dead = queue.dead_letters().await;
            if !dead.is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        assert_eq!(dead.len(), 1);
        assert_eq!(dead[0].attempts, 3);
        assert!(dead[0].last_error.as_deref().unwrap().contains("connection refused"));
    }
}
