//! In-process sliding-window rate limiter.
//!
//! Each client key maps to the instants of its admitted requests inside the
//! trailing window. State is process-local: separate server instances keep
//! separate, unshared quotas.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// Length of the trailing window.
pub const WINDOW: Duration = Duration::from_secs(60);

/// Outcome of a single admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// The request was recorded; `remaining` more fit in the current window.
    Admitted { remaining: usize },
    /// The window is full until the oldest entry ages out.
    Rejected { retry_after: Duration },
}

impl Decision {
    pub fn is_admitted(&self) -> bool {
        matches!(self, Decision::Admitted { .. })
    }
}

/// Sliding-window limiter keyed by client.
#[derive(Debug)]
pub struct SlidingWindowLimiter {
    requests_per_minute: usize,
    window: Duration,
    entries: Mutex<HashMap<String, VecDeque<Instant>>>,
}

impl SlidingWindowLimiter {
    /// Creates a limiter admitting `requests_per_minute` requests per key
    /// within any trailing 60 seconds.
    pub fn new(requests_per_minute: usize) -> Self {
        Self {
            requests_per_minute,
            window: WINDOW,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn requests_per_minute(&self) -> usize {
        self.requests_per_minute
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Prunes `key`'s history to the window ending at `now`, then either
    /// records `now` and admits, or rejects when the window is full.
    ///
    /// Pruning, the length check and the append happen under one lock, so two
    /// concurrent callers can never both take the last free slot.
    pub fn admit(&self, key: &str, now: Instant) -> Decision {
        let mut entries = self.lock();

        let history = entries.entry(key.to_string()).or_default();
        prune(history, now, self.window);

        if history.len() >= self.requests_per_minute {
            let retry_after = history
                .front()
                .map(|oldest| self.window.saturating_sub(now.saturating_duration_since(*oldest)))
                .unwrap_or(self.window);
            return Decision::Rejected { retry_after };
        }

        history.push_back(now);
        Decision::Admitted {
            remaining: self.requests_per_minute - history.len(),
        }
    }

    /// Drops every key whose history is empty once pruned at `now`.
    ///
    /// # Returns
    ///
    /// The number of keys removed.
    pub fn purge_idle(&self, now: Instant) -> usize {
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|_, history| {
            prune(history, now, self.window);
            !history.is_empty()
        });
        before - entries.len()
    }

    /// Number of keys currently holding state.
    pub fn tracked_keys(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, VecDeque<Instant>>> {
        // The map stays structurally valid even if a holder panicked.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Removes entries at least `window` old. Entries are in arrival order, so
/// only the front needs checking.
fn prune(history: &mut VecDeque<Instant>, now: Instant, window: Duration) {
    while let Some(oldest) = history.front() {
        if now.saturating_duration_since(*oldest) < window {
            break;
        }
        history.pop_front();
    }
}
