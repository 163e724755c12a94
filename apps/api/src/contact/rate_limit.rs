use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::time::Instant;

#[derive(Debug, Error)]
pub enum RateLimitError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),
}

/// Fixed-window submission counter keyed by caller identity.
///
/// `check` records one hit and returns whether it is within the window's limit.
#[async_trait]
pub trait RateLimitStore: Send + Sync {
    async fn check(&self, key: &str) -> Result<bool, RateLimitError>;
}

#[derive(Debug, Clone, Copy)]
pub struct RateLimitPolicy {
    pub max_requests: u32,
    pub window: Duration,
}

impl Default for RateLimitPolicy {
    fn default() -> Self {
        Self {
            max_requests: 5,
            window: Duration::from_secs(60),
        }
    }
}

#[derive(Debug)]
struct Window {
    count: u32,
    resets_at: Instant,
}

/// Per-process counters. Lost on restart and not shared between instances.
pub struct InMemoryRateLimiter {
    policy: RateLimitPolicy,
    windows: Mutex<HashMap<String, Window>>,
}

impl InMemoryRateLimiter {
    pub fn new(policy: RateLimitPolicy) -> Self {
        Self {
            policy,
            windows: Mutex::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl RateLimitStore for InMemoryRateLimiter {
    async fn check(&self, key: &str) -> Result<bool, RateLimitError> {
        let now = Instant::now();
        let mut windows = self.windows.lock().unwrap_or_else(|e| e.into_inner());

        // Expired windows would otherwise accumulate for every caller ever seen.
        windows.retain(|_, w| w.resets_at > now);

        match windows.get_mut(key) {
            Some(window) if window.count >= self.policy.max_requests => Ok(false),
            Some(window) => {
                window.count += 1;
                Ok(true)
            }
            None => {
                windows.insert(
                    key.to_string(),
                    Window {
                        count: 1,
                        resets_at: now + self.policy.window,
                    },
                );
                Ok(true)
            }
        }
    }
}

/// Counters in Redis, shared by every instance pointed at the same server.
pub struct RedisRateLimiter {
    client: redis::Client,
    policy: RateLimitPolicy,
    prefix: String,
}

impl RedisRateLimiter {
    pub fn new(client: redis::Client, policy: RateLimitPolicy) -> Self {
        Self {
            client,
            policy,
            prefix: "contact:rate".to_string(),
        }
    }

    /// One MULTI/EXEC transaction: create the counter with the window's expiry
    /// if it does not exist yet, then count the hit. A key can never be
    /// incremented without also having an expiry.
    fn hit_pipeline(&self, key: &str) -> redis::Pipeline {
        let redis_key = format!("{}:{}", self.prefix, key);
        let window_ms = self.policy.window.as_millis() as u64;

        let mut pipe = redis::pipe();
        pipe.atomic()
            .cmd("SET")
            .arg(&redis_key)
            .arg(0)
            .arg("PX")
            .arg(window_ms)
            .arg("NX")
            .ignore()
            .cmd("INCR")
            .arg(&redis_key);
        pipe
    }
}

#[async_trait]
impl RateLimitStore for RedisRateLimiter {
    async fn check(&self, key: &str) -> Result<bool, RateLimitError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let (count,): (u64,) = self.hit_pipeline(key).query_async(&mut conn).await?;
        Ok(count <= u64::from(self.policy.max_requests))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter() -> InMemoryRateLimiter {
        InMemoryRateLimiter::new(RateLimitPolicy::default())
    }

    #[tokio::test(start_paused = true)]
    async fn test_sixth_request_in_window_is_rejected() {
        let limiter = limiter();
        for _ in 0..5 {
            assert!(limiter.check("203.0.113.7").await.unwrap());
        }
        assert!(!limiter.check("203.0.113.7").await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_keys_are_independent() {
        let limiter = limiter();
        for _ in 0..5 {
            limiter.check("a").await.unwrap();
        }
        assert!(!limiter.check("a").await.unwrap());
        assert!(limiter.check("b").await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_window_resets() {
        let limiter = limiter();
        for _ in 0..6 {
            limiter.check("a").await.unwrap();
        }
        assert!(!limiter.check("a").await.unwrap());

        tokio::time::advance(Duration::from_secs(61)).await;
        assert!(limiter.check("a").await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_window_is_fixed_not_sliding() {
        let limiter = InMemoryRateLimiter::new(RateLimitPolicy {
            max_requests: 2,
            window: Duration::from_secs(10),
        });
        assert!(limiter.check("a").await.unwrap());
        tokio::time::advance(Duration::from_secs(9)).await;
        assert!(limiter.check("a").await.unwrap());
        assert!(!limiter.check("a").await.unwrap());

        tokio::time::advance(Duration::from_secs(2)).await;
        assert!(limiter.check("a").await.unwrap());
    }

    #[test]
    fn test_redis_hit_sets_expiry_in_same_transaction() {
        let client = redis::Client::open("redis://127.0.0.1/").unwrap();
        let limiter = RedisRateLimiter::new(client, RateLimitPolicy::default());
        let packed = limiter.hit_pipeline("203.0.113.7").get_packed_pipeline();
        let packed = String::from_utf8(packed).unwrap();

        let position = |needle: &str| packed.find(needle).unwrap();
        assert!(position("MULTI") < position("SET"));
        assert!(position("SET") < position("INCR"));
        assert!(position("INCR") < position("EXEC"));
        assert!(packed.contains("contact:rate:203.0.113.7"));
        assert!(packed.contains("\r\nPX\r\n$5\r\n60000\r\n$2\r\nNX\r\n"));
    }
}
