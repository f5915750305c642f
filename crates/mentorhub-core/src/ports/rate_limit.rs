//! Rate limiting port.

use std::time::Duration;

/// Per-key rate limiter. Checks are synchronous so middleware never blocks
/// an executor thread waiting on them.
pub trait RateLimiter: Send + Sync {
    /// Record one request for `key` and report whether it is allowed.
    fn check(&self, key: &str) -> RateLimitResult;
}

/// Result of a rate limit check.
#[derive(Debug, Clone)]
pub struct RateLimitResult {
    pub allowed: bool,
    /// Time until the next request for this key would be allowed.
    pub retry_after: Duration,
}
