//! In-memory job queue implementation.
//!
//! Jobs are stored in memory and processed by local workers.
//! Note: Jobs are lost on server restart.

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{Mutex, mpsc};

use mentorhub_core::ports::{Job, JobQueue, JobQueueError, JobResult, QueueStats};

/// Boxed future returned by job handlers.
pub type JobFuture = Pin<Box<dyn Future<Output = JobResult> + Send>>;

/// In-memory job queue configuration.
#[derive(Debug, Clone)]
pub struct InMemoryJobQueueConfig {
    /// Maximum queue size (0 = unlimited).
    pub max_size: usize,
    /// Number of worker tasks.
    pub workers: usize,
    /// Delay before the first retry; the n-th retry waits n times as long.
    pub retry_backoff: Duration,
    /// Dead-lettered jobs kept for inspection; the oldest are dropped first.
    pub dead_letter_capacity: usize,
}

impl Default for InMemoryJobQueueConfig {
    fn default() -> Self {
        Self {
            max_size: 10000,
            workers: 2,
            retry_backoff: Duration::from_millis(500),
            dead_letter_capacity: 1000,
        }
    }
}

/// Bounded list of the most recent dead-lettered jobs.
struct DeadLetters {
    capacity: usize,
    jobs: Mutex<VecDeque<Job>>,
}

impl DeadLetters {
    fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            jobs: Mutex::new(VecDeque::new()),
        }
    }

    async fn push(&self, job: Job) {
        let mut jobs = self.jobs.lock().await;
        if jobs.len() == self.capacity {
            if let Some(dropped) = jobs.pop_front() {
                tracing::warn!(job_id = %dropped.id, "Dead-letter list full, dropping oldest job");
            }
        }
        jobs.push_back(job);
    }

    async fn snapshot(&self) -> Vec<Job> {
        self.jobs.lock().await.iter().cloned().collect()
    }
}

/// In-memory job queue with linear retry backoff and a dead-letter list.
pub struct InMemoryJobQueue {
    stats: Arc<JobStats>,
    config: InMemoryJobQueueConfig,
    job_sender: mpsc::Sender<Job>,
    job_receiver: Arc<Mutex<mpsc::Receiver<Job>>>,
    dead_letters: Arc<DeadLetters>,
}

#[derive(Default)]
struct JobStats {
    pending: AtomicUsize,
    processing: AtomicUsize,
    completed: AtomicUsize,
    failed: AtomicUsize,
}

impl InMemoryJobQueue {
    pub fn new(config: InMemoryJobQueueConfig) -> Self {
        let capacity = if config.max_size == 0 {
            10000
        } else {
            config.max_size
        };
        let (tx, rx) = mpsc::channel(capacity);

        Self {
            stats: Arc::new(JobStats::default()),
            dead_letters: Arc::new(DeadLetters::new(config.dead_letter_capacity)),
            config,
            job_sender: tx,
            job_receiver: Arc::new(Mutex::new(rx)),
        }
    }

    /// Spawn the configured number of workers, all running `handler`.
    pub fn start_worker<F>(&self, handler: F)
    where
        F: Fn(Job) -> JobFuture + Send + Sync + 'static,
    {
        let handler = Arc::new(handler);

        for worker_id in 0..self.config.workers.max(1) {
            let worker = Worker {
                id: worker_id,
                handler: handler.clone(),
                receiver: self.job_receiver.clone(),
                sender: self.job_sender.clone(),
                stats: self.stats.clone(),
                dead_letters: self.dead_letters.clone(),
                retry_backoff: self.config.retry_backoff,
            };
            tokio::spawn(worker.run());
        }
    }
}

struct Worker<F> {
    id: usize,
    handler: Arc<F>,
    receiver: Arc<Mutex<mpsc::Receiver<Job>>>,
    sender: mpsc::Sender<Job>,
    stats: Arc<JobStats>,
    dead_letters: Arc<DeadLetters>,
    retry_backoff: Duration,
}

impl<F> Worker<F>
where
    F: Fn(Job) -> JobFuture + Send + Sync + 'static,
{
    async fn run(self) {
        tracing::info!(worker = self.id, "Job worker started");

        loop {
            let job = {
                let mut rx = self.receiver.lock().await;
                rx.recv().await
            };

            let Some(mut job) = job else {
                tracing::info!(worker = self.id, "Job worker shutting down");
                break;
            };

            self.stats.processing.fetch_add(1, Ordering::Relaxed);
            self.stats.pending.fetch_sub(1, Ordering::Relaxed);

            job.attempts += 1;
            tracing::debug!(
                worker = self.id,
                job_id = %job.id,
                job_type = %job.job_type,
                attempt = job.attempts,
                "Processing job"
            );

            let result = (self.handler)(job.clone()).await;

            match result {
                JobResult::Success => {
                    self.stats.completed.fetch_add(1, Ordering::Relaxed);
                    tracing::debug!(job_id = %job.id, "Job completed successfully");
                }
                JobResult::Retry(reason) if job.attempts < job.max_attempts => {
                    tracing::warn!(
                        job_id = %job.id,
                        attempt = job.attempts,
                        max_attempts = job.max_attempts,
                        reason = %reason,
                        "Job failed, will retry"
                    );
                    job.last_error = Some(reason);
                    self.schedule_retry(job);
                }
                JobResult::Retry(reason) | JobResult::Failed(reason) => {
                    tracing::error!(
                        job_id = %job.id,
                        job_type = %job.job_type,
                        attempts = job.attempts,
                        reason = %reason,
                        "Job moved to dead-letter list"
                    );
                    job.last_error = Some(reason);
                    self.stats.failed.fetch_add(1, Ordering::Relaxed);
                    self.dead_letters.push(job).await;
                }
            }
            self.stats.processing.fetch_sub(1, Ordering::Relaxed);
        }
    }

    fn schedule_retry(&self, job: Job) {
        let delay = self.retry_backoff * job.attempts;
        let sender = self.sender.clone();
        let stats = self.stats.clone();
        let dead_letters = self.dead_letters.clone();

        stats.pending.fetch_add(1, Ordering::Relaxed);
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Err(e) = sender.send(job).await {
                stats.pending.fetch_sub(1, Ordering::Relaxed);
                stats.failed.fetch_add(1, Ordering::Relaxed);
                let mut job = e.0;
                tracing::error!(job_id = %job.id, "Failed to re-enqueue job for retry");
                job.last_error = Some("queue closed before retry".to_string());
                dead_letters.push(job).await;
            }
        });
    }
}

#[async_trait]
impl JobQueue for InMemoryJobQueue {
    async fn enqueue(&self, job: Job) -> Result<(), JobQueueError> {
        if self.config.max_size > 0 {
            let current_size = self.stats.pending.load(Ordering::Relaxed);
            if current_size >= self.config.max_size {
                return Err(JobQueueError::QueueFull);
            }
        }

        self.stats.pending.fetch_add(1, Ordering::Relaxed);

        let job_id = job.id.clone();
        if let Err(e) = self.job_sender.try_send(job) {
            self.stats.pending.fetch_sub(1, Ordering::Relaxed);
            return Err(match e {
                mpsc::error::TrySendError::Full(_) => JobQueueError::QueueFull,
                mpsc::error::TrySendError::Closed(_) => {
                    JobQueueError::EnqueueError("queue is closed".to_string())
                }
            });
        }

        tracing::debug!(
            job_id = %job_id,
            queue_size = self.stats.pending.load(Ordering::Relaxed),
            "Job enqueued"
        );

        Ok(())
    }

    async fn stats(&self) -> Result<QueueStats, JobQueueError> {
        Ok(QueueStats {
            pending: self.stats.pending.load(Ordering::Relaxed),
            processing: self.stats.processing.load(Ordering::Relaxed),
            completed: self.stats.completed.load(Ordering::Relaxed),
            failed: self.stats.failed.load(Ordering::Relaxed),
        })
    }

    async fn dead_letters(&self) -> Vec<Job> {
        self.dead_letters.snapshot().await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicU32;

    use serde_json::json;

    use super::*;

    fn queue() -> InMemoryJobQueue {
        InMemoryJobQueue::new(InMemoryJobQueueConfig {
            max_size: 16,
            workers: 1,
            retry_backoff: Duration::from_millis(10),
            dead_letter_capacity: 2,
        })
    }

    async fn settle(queue: &InMemoryJobQueue) -> QueueStats {
        for _ in 0..200 {
            let stats = queue.stats().await.unwrap();
            if stats.pending == 0 && stats.processing == 0 {
                return stats;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        queue.stats().await.unwrap()
    }

    #[tokio::test]
    async fn test_successful_job_completes() {
        let queue = queue();
        queue.start_worker(|_job| Box::pin(async { JobResult::Success }));

        queue.enqueue(Job::new("noop", json!({}))).await.unwrap();

        let stats = settle(&queue).await;
        assert_eq!(stats.completed, 1);
        assert!(queue.dead_letters().await.is_empty());
    }

    #[tokio::test]
    async fn test_retries_until_success() {
        let queue = queue();
        let calls = Arc::new(AtomicU32::new(0));
        let seen = calls.clone();
        queue.start_worker(move |_job| {
            let seen = seen.clone();
            Box::pin(async move {
                if seen.fetch_add(1, Ordering::SeqCst) < 2 {
                    JobResult::Retry("flaky".to_string())
                } else {
                    JobResult::Success
                }
            })
        });

        queue.enqueue(Job::new("flaky", json!({}))).await.unwrap();

        let stats = settle(&queue).await;
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(stats.completed, 1);
        assert_eq!(stats.failed, 0);
    }

    #[tokio::test]
    async fn test_exhausted_job_is_dead_lettered() {
        let queue = queue();
        queue.start_worker(|_job| Box::pin(async { JobResult::Retry("down".to_string()) }));

        let job = Job::new("doomed", json!({"n": 1})).with_max_attempts(2);
        let id = job.id.clone();
        queue.enqueue(job).await.unwrap();

        let stats = settle(&queue).await;
        let dead = queue.dead_letters().await;

        assert_eq!(stats.failed, 1);
        assert_eq!(dead.len(), 1);
        assert_eq!(dead[0].id, id);
        assert_eq!(dead[0].attempts, 2);
        assert_eq!(dead[0].last_error.as_deref(), Some("down"));
    }

    #[tokio::test]
    async fn test_permanent_failure_skips_retries() {
        let queue = queue();
        queue.start_worker(|_job| Box::pin(async { JobResult::Failed("bad payload".to_string()) }));

        queue.enqueue(Job::new("broken", json!(null))).await.unwrap();

        settle(&queue).await;
        let dead = queue.dead_letters().await;
        assert_eq!(dead.len(), 1);
        assert_eq!(dead[0].attempts, 1);
    }

    #[tokio::test]
    async fn test_dead_letters_keep_only_the_newest() {
        let queue = queue();
        queue.start_worker(|_job| Box::pin(async { JobResult::Failed("bad".to_string()) }));

        let mut ids = Vec::new();
        for n in 0..3 {
            let job = Job::new("broken", json!({ "n": n }));
            ids.push(job.id.clone());
            queue.enqueue(job).await.unwrap();
            settle(&queue).await;
        }

        let dead: Vec<_> = queue.dead_letters().await.into_iter().map(|j| j.id).collect();
        assert_eq!(dead, ids[1..]);
        assert_eq!(queue.stats().await.unwrap().failed, 3);
    }

    #[tokio::test]
    async fn test_full_queue_rejects_jobs() {
        let queue = InMemoryJobQueue::new(InMemoryJobQueueConfig {
            max_size: 1,
            workers: 1,
            retry_backoff: Duration::from_millis(10),
            ..Default::default()
        });

        queue.enqueue(Job::new("a", json!({}))).await.unwrap();
        assert!(matches!(
            queue.enqueue(Job::new("b", json!({}))).await,
            Err(JobQueueError::QueueFull)
        ));
    }
}
