//! In-memory login throttling.
//!
//! DESIGN
//! ======
//! Sliding-window counters of failed login attempts backed by
//! `HashMap<String, VecDeque<Instant>>`, keyed by normalized email. Once a
//! key has `max_attempts` failures inside the window, further attempts are
//! refused until the oldest failure ages out. A successful login clears the
//! key.
//!
//! TRADE-OFFS
//! ==========
//! State is per-process and lost on restart; a multi-instance deployment
//! throttles per instance.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("too many failed login attempts (max {limit} per {window_secs}s), try again later")]
pub struct LoginThrottled {
    pub limit: usize,
    pub window_secs: u64,
}

#[derive(Clone)]
pub struct LoginThrottle {
    inner: Arc<Mutex<HashMap<String, VecDeque<Instant>>>>,
    max_attempts: usize,
    window: Duration,
}

impl LoginThrottle {
    #[must_use]
    pub fn new(max_attempts: usize, window: Duration) -> Self {
        Self { inner: Arc::new(Mutex::new(HashMap::new())), max_attempts: max_attempts.max(1), window }
    }

    /// Refuse the attempt if `key` has exhausted its failures in the window.
    pub fn check(&self, key: &str) -> Result<(), LoginThrottled> {
        self.check_at(key, Instant::now())
    }

    fn check_at(&self, key: &str, now: Instant) -> Result<(), LoginThrottled> {
        let mut inner = self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        let Some(failures) = inner.get_mut(key) else {
            return Ok(());
        };
        prune_window(failures, now, self.window);
        if failures.len() >= self.max_attempts {
            return Err(LoginThrottled { limit: self.max_attempts, window_secs: self.window.as_secs() });
        }
        if failures.is_empty() {
            inner.remove(key);
        }
        Ok(())
    }

    pub fn record_failure(&self, key: &str) {
        self.record_failure_at(key, Instant::now());
    }

    fn record_failure_at(&self, key: &str, now: Instant) {
        let mut inner = self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        // Sweep every key so one-off emails don't accumulate.
        inner.retain(|_, failures| {
            prune_window(failures, now, self.window);
            !failures.is_empty()
        });
        inner.entry(key.to_owned()).or_default().push_back(now);
    }

    pub fn clear(&self, key: &str) {
        let mut inner = self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        inner.remove(key);
    }
}

fn prune_window(deque: &mut VecDeque<Instant>, now: Instant, window: Duration) {
    while let Some(&front) = deque.front() {
        if now.duration_since(front) > window {
            deque.pop_front();
        } else {
            break;
        }
    }
}

#[cfg(test)]
#[path = "rate_limit_test.rs"]
mod tests;
