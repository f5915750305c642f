//! In-memory rate limiter using governor crate.

use std::num::NonZeroU32;
use std::time::Duration;

use governor::clock::{Clock, DefaultClock};
use governor::state::keyed::DefaultKeyedStateStore;
use governor::{Quota, RateLimiter as GovernorRateLimiter};

use mentorhub_core::ports::{RateLimitResult, RateLimiter};

type KeyedRateLimiter = GovernorRateLimiter<String, DefaultKeyedStateStore<String>, DefaultClock>;

/// Keys tracked before idle ones are pruned.
const PRUNE_THRESHOLD: usize = 10_000;

/// In-memory rate limiter configuration.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Maximum requests per window.
    pub max_requests: u32,
    /// Window duration.
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 20,
            window: Duration::from_secs(60),
        }
    }
}

/// Per-key GCRA rate limiter.
///
/// Note: Limits are per-process, not distributed across instances.
pub struct InMemoryRateLimiter {
    limiter: KeyedRateLimiter,
    clock: DefaultClock,
}

impl InMemoryRateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        let burst = NonZeroU32::new(config.max_requests).unwrap_or(NonZeroU32::MIN);
        let quota = Quota::with_period(config.window / burst.get())
            .unwrap_or_else(|| Quota::per_second(burst))
            .allow_burst(burst);

        Self {
            limiter: KeyedRateLimiter::keyed(quota),
            clock: DefaultClock::default(),
        }
    }
}

impl RateLimiter for InMemoryRateLimiter {
    fn check(&self, key: &str) -> RateLimitResult {
        if self.limiter.len() > PRUNE_THRESHOLD {
            self.limiter.retain_recent();
        }

        match self.limiter.check_key(&key.to_string()) {
            Ok(_) => RateLimitResult {
                allowed: true,
                retry_after: Duration::ZERO,
            },
            Err(not_until) => {
                let retry_after = not_until.wait_time_from(self.clock.now());
                tracing::debug!(key = %key, retry_after_ms = retry_after.as_millis() as u64, "Rate limit exceeded");
                RateLimitResult {
                    allowed: false,
                    retry_after,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(max_requests: u32) -> InMemoryRateLimiter {
        InMemoryRateLimiter::new(RateLimitConfig {
            max_requests,
            window: Duration::from_secs(60),
        })
    }

    #[test]
    fn test_allows_burst_then_blocks() {
        let limiter = limiter(3);

        for _ in 0..3 {
            assert!(limiter.check("10.0.0.1").allowed);
        }
        let blocked = limiter.check("10.0.0.1");
        assert!(!blocked.allowed);
        assert!(blocked.retry_after > Duration::ZERO);
    }

    #[test]
    fn test_keys_are_independent() {
        let limiter = limiter(1);

        assert!(limiter.check("10.0.0.1").allowed);
        assert!(!limiter.check("10.0.0.1").allowed);
        assert!(limiter.check("10.0.0.2").allowed);
    }

    #[test]
    fn test_zero_quota_still_allows_one_request() {
        let limiter = limiter(0);
        assert!(limiter.check("10.0.0.1").allowed);
    }
}
