//! Global token bucket rate limiter.
//!
//! One bucket is shared by every request that presents a bearer token.
//! Refill is bursty: whole intervals are credited at once and any partial
//! interval is discarded when the bucket is topped up.

use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use crate::config::RateLimitConfig;

/// Mutable bucket state. Only ever touched under the limiter's lock.
#[derive(Debug)]
struct Bucket {
    tokens: u64,
    last_refill: Instant,
}

impl Bucket {
    fn refill(&mut self, now: Instant, capacity: u64, interval: Duration, units: u64) {
        let elapsed = now.saturating_duration_since(self.last_refill);
        if elapsed > interval {
            let intervals = (elapsed.as_nanos() / interval.as_nanos()) as u64;
            let added = intervals.saturating_mul(units);
            self.tokens = self.tokens.saturating_add(added).min(capacity);
            self.last_refill = now;
        }
    }
}

/// A process-wide token bucket.
///
/// `try_consume` performs refill and consume inside one critical section so
/// concurrent callers can never admit more than the bucket holds.
#[derive(Debug)]
pub struct RateLimiter {
    bucket: Mutex<Bucket>,
    capacity: u64,
    refill_interval: Duration,
    units_per_interval: u64,
}

impl RateLimiter {
    /// Create a full bucket.
    pub fn new(capacity: u64, refill_interval: Duration, units_per_interval: u64) -> Self {
        Self::starting_at(capacity, refill_interval, units_per_interval, Instant::now())
    }

    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self::new(
            config.capacity,
            Duration::from_millis(config.refill_interval_ms),
            config.units_per_interval,
        )
    }

    /// Create a full bucket whose refill clock starts at `start`.
    pub fn starting_at(
        capacity: u64,
        refill_interval: Duration,
        units_per_interval: u64,
        start: Instant,
    ) -> Self {
        Self {
            bucket: Mutex::new(Bucket {
                tokens: capacity,
                last_refill: start,
            }),
            capacity,
            refill_interval,
            units_per_interval,
        }
    }

    /// Refill, then take one unit if any remain.
    pub fn try_consume(&self) -> bool {
        self.try_consume_at(Instant::now())
    }

    /// `try_consume` against an explicit clock reading.
    pub fn try_consume_at(&self, now: Instant) -> bool {
        let mut bucket = self.bucket.lock().unwrap_or_else(PoisonError::into_inner);
        bucket.refill(now, self.capacity, self.refill_interval, self.units_per_interval);

        if bucket.tokens > 0 {
            bucket.tokens -= 1;
            true
        } else {
            false
        }
    }

    /// Units currently left, without refilling.
    pub fn available(&self) -> u64 {
        self.bucket
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .tokens
    }

    pub fn capacity(&self) -> u64 {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;

    const INTERVAL: Duration = Duration::from_millis(2000);

    #[test]
    fn test_capacity_then_exhaustion() {
        let start = Instant::now();
        let limiter = RateLimiter::starting_at(1000, INTERVAL, 1, start);

        for i in 0..1000 {
            assert!(limiter.try_consume_at(start), "call {} should succeed", i + 1);
        }
        assert!(!limiter.try_consume_at(start));
        assert_eq!(limiter.available(), 0);
    }

    #[test]
    fn test_refill_after_one_interval() {
        let start = Instant::now();
        let limiter = RateLimiter::starting_at(3, INTERVAL, 1, start);
        for _ in 0..3 {
            assert!(limiter.try_consume_at(start));
        }

        // Exactly one interval is not enough: elapsed must exceed it.
        assert!(!limiter.try_consume_at(start + INTERVAL));

        let later = start + INTERVAL + Duration::from_millis(1);
        assert!(limiter.try_consume_at(later));
        assert!(!limiter.try_consume_at(later));
    }

    #[test]
    fn test_refill_is_whole_intervals_and_capped() {
        let start = Instant::now();
        let limiter = RateLimiter::starting_at(10, INTERVAL, 2, start);
        for _ in 0..10 {
            limiter.try_consume_at(start);
        }

        // 3.5 intervals credit 3 * 2 units; one is consumed by the call.
        let t1 = start + INTERVAL * 3 + INTERVAL / 2;
        assert!(limiter.try_consume_at(t1));
        assert_eq!(limiter.available(), 5);

        // A long idle period never overfills the bucket.
        let t2 = t1 + INTERVAL * 1000;
        assert!(limiter.try_consume_at(t2));
        assert_eq!(limiter.available(), 9);
    }

    #[test]
    fn test_partial_interval_is_dropped_on_refill() {
        let start = Instant::now();
        let limiter = RateLimiter::starting_at(1, INTERVAL, 1, start);
        assert!(limiter.try_consume_at(start));

        let t1 = start + INTERVAL + INTERVAL / 2;
        assert!(limiter.try_consume_at(t1));

        // Only half an interval has passed since the last refill.
        let t2 = t1 + INTERVAL / 2 + Duration::from_millis(1);
        assert!(!limiter.try_consume_at(t2));
    }

    #[test]
    fn test_concurrent_consumers_never_over_admit() {
        let limiter = Arc::new(RateLimiter::new(500, Duration::from_secs(3600), 1));
        let admitted = Arc::new(AtomicU64::new(0));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let limiter = limiter.clone();
                let admitted = admitted.clone();
                std::thread::spawn(move || {
                    for _ in 0..200 {
                        if limiter.try_consume() {
                            admitted.fetch_add(1, Ordering::Relaxed);
                        }
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(admitted.load(Ordering::Relaxed), 500);
    }
}
