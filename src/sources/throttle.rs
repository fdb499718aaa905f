//! Request pacing for the search source
//!
//! The aggregator asks its [`RateLimiter`] for permission before every search
//! query. [`TokenBucket`] keeps its decision logic separate from the clock so
//! it can be exercised with synthetic instants.

use async_trait::async_trait;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Gate that paces outbound calls
#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Wait until the next call is allowed
    async fn acquire(&self);
}

/// Limiter that never waits
#[derive(Debug, Default, Clone, Copy)]
pub struct Unlimited;

#[async_trait]
impl RateLimiter for Unlimited {
    async fn acquire(&self) {}
}

/// Classic token bucket
///
/// Starts full. One token is added every `refill` up to `capacity`.
#[derive(Debug)]
pub struct TokenBucket {
    capacity: f64,
    refill: Duration,
    state: Mutex<BucketState>,
}

#[derive(Debug)]
struct BucketState {
    tokens: f64,
    last: Option<Instant>,
}

impl TokenBucket {
    /// Create a bucket holding `capacity` tokens, refilled one per `refill`
    pub fn new(capacity: u32, refill: Duration) -> Self {
        let capacity = f64::from(capacity.max(1));
        Self {
            capacity,
            refill,
            state: Mutex::new(BucketState {
                tokens: capacity,
                last: None,
            }),
        }
    }

    /// At most one call per `interval`, first call immediate
    pub fn per_interval(interval: Duration) -> Self {
        Self::new(1, interval)
    }

    /// Try to take a token at `now`
    ///
    /// Returns how long to wait before a token will be available if the
    /// bucket is empty.
    pub fn try_acquire_at(&self, now: Instant) -> Result<(), Duration> {
        if self.refill.is_zero() {
            return Ok(());
        }

        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());

        if let Some(last) = state.last {
            let elapsed = now.saturating_duration_since(last);
            let earned = elapsed.as_secs_f64() / self.refill.as_secs_f64();
            state.tokens = (state.tokens + earned).min(self.capacity);
        }
        state.last = Some(now);

        if state.tokens >= 1.0 {
            state.tokens -= 1.0;
            Ok(())
        } else {
            let missing = 1.0 - state.tokens;
            Err(Duration::from_secs_f64(self.refill.as_secs_f64() * missing))
        }
    }
}

#[async_trait]
impl RateLimiter for TokenBucket {
    async fn acquire(&self) {
        loop {
            match self.try_acquire_at(Instant::now()) {
                Ok(()) => return,
                Err(wait) => tokio::time::sleep(wait).await,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const SECOND: Duration = Duration::from_secs(1);

    #[test]
    fn test_first_call_is_immediate() {
        let bucket = TokenBucket::per_interval(SECOND);
        assert!(bucket.try_acquire_at(Instant::now()).is_ok());
    }

    #[test]
    fn test_second_call_waits_full_interval() {
        let bucket = TokenBucket::per_interval(SECOND);
        let t0 = Instant::now();

        bucket.try_acquire_at(t0).unwrap();
        let wait = bucket.try_acquire_at(t0).unwrap_err();
        assert_relative_eq!(wait.as_secs_f64(), 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_partial_refill_shortens_wait() {
        let bucket = TokenBucket::per_interval(SECOND);
        let t0 = Instant::now();

        bucket.try_acquire_at(t0).unwrap();
        let wait = bucket
            .try_acquire_at(t0 + Duration::from_millis(400))
            .unwrap_err();
        assert_relative_eq!(wait.as_secs_f64(), 0.6, epsilon = 1e-6);
    }

    #[test]
    fn test_token_available_after_interval() {
        let bucket = TokenBucket::per_interval(SECOND);
        let t0 = Instant::now();

        bucket.try_acquire_at(t0).unwrap();
        assert!(bucket.try_acquire_at(t0 + SECOND).is_ok());
        assert!(bucket.try_acquire_at(t0 + SECOND).is_err());
        assert!(bucket.try_acquire_at(t0 + SECOND * 2).is_ok());
    }

    #[test]
    fn test_idle_time_does_not_exceed_capacity() {
        let bucket = TokenBucket::new(2, SECOND);
        let t0 = Instant::now();

        bucket.try_acquire_at(t0).unwrap();
        bucket.try_acquire_at(t0).unwrap();
        assert!(bucket.try_acquire_at(t0).is_err());

        let later = t0 + SECOND * 60;
        assert!(bucket.try_acquire_at(later).is_ok());
        assert!(bucket.try_acquire_at(later).is_ok());
        assert!(bucket.try_acquire_at(later).is_err());
    }

    #[test]
    fn test_zero_interval_never_blocks() {
        let bucket = TokenBucket::per_interval(Duration::ZERO);
        let t0 = Instant::now();
        for _ in 0..10 {
            assert!(bucket.try_acquire_at(t0).is_ok());
        }
    }

    #[tokio::test]
    async fn test_unlimited() {
        Unlimited.acquire().await;
        Unlimited.acquire().await;
    }
}
