use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

#[derive(Debug)]
struct Buckets {
    hits: HashMap<String, VecDeque<Instant>>,
    last_sweep: Instant,
}

/// Sliding-window limiter keyed by client address. Keys with no hit inside the
/// window are dropped at most once per window.
#[derive(Debug, Clone)]
pub struct IpRateLimiter {
    inner: Arc<Mutex<Buckets>>,
    window: Duration,
    max_requests: usize,
}

impl IpRateLimiter {
    pub fn new(window: Duration, max_requests: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Buckets {
                hits: HashMap::new(),
                last_sweep: Instant::now(),
            })),
            window,
            max_requests,
        }
    }

    pub fn allow(&self, key: &str) -> bool {
        self.allow_at(key, Instant::now())
    }

    fn allow_at(&self, key: &str, now: Instant) -> bool {
        let mut guard = self.inner.lock();

        if now.saturating_duration_since(guard.last_sweep) >= self.window {
            let window = self.window;
            guard.hits.retain(|_, queue| {
                queue
                    .back()
                    .is_some_and(|last| now.saturating_duration_since(*last) <= window)
            });
            guard.last_sweep = now;
        }

        let queue = guard.hits.entry(key.to_string()).or_default();

        while let Some(front) = queue.front() {
            if now.saturating_duration_since(*front) > self.window {
                queue.pop_front();
            } else {
                break;
            }
        }

        if queue.len() >= self.max_requests {
            return false;
        }

        queue.push_back(now);
        true
    }

    #[cfg(test)]
    fn tracked_keys(&self) -> usize {
        self.inner.lock().hits.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blocks_after_max_requests_within_window() {
        let limiter = IpRateLimiter::new(Duration::from_secs(60), 2);
        let now = Instant::now();
        assert!(limiter.allow_at("1.2.3.4", now));
        assert!(limiter.allow_at("1.2.3.4", now));
        assert!(!limiter.allow_at("1.2.3.4", now));
        assert!(limiter.allow_at("5.6.7.8", now));
    }

    #[test]
    fn window_expiry_frees_capacity() {
        let limiter = IpRateLimiter::new(Duration::from_secs(1), 1);
        let now = Instant::now();
        assert!(limiter.allow_at("ip", now));
        assert!(!limiter.allow_at("ip", now + Duration::from_millis(500)));
        assert!(limiter.allow_at("ip", now + Duration::from_secs(2)));
    }

    #[test]
    fn idle_keys_are_evicted() {
        let limiter = IpRateLimiter::new(Duration::from_secs(1), 5);
        let now = Instant::now();
        for ip in ["10.0.0.1", "10.0.0.2", "10.0.0.3"] {
            assert!(limiter.allow_at(ip, now));
        }
        assert_eq!(limiter.tracked_keys(), 3);

        assert!(limiter.allow_at("10.0.0.9", now + Duration::from_secs(3)));
        assert_eq!(limiter.tracked_keys(), 1);
    }
}
