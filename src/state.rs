use std::sync::Arc;

use crate::config::Config;
use crate::db::Db;
use crate::rate_limit::SlidingWindowLimiter;

/// The application's state.
#[derive(Clone)]
pub struct AppState {
    /// The storage backend.
    pub db: Db,
    /// The application's configuration.
    pub config: Config,
    /// Per-client request limiter shared by every request.
    pub rate_limiter: Arc<SlidingWindowLimiter>,
}

impl AppState {
    /// Creates a new `AppState`.
    ///
    /// # Arguments
    ///
    /// * `config` - The application's configuration.
    /// * `db` - The storage backend.
    pub fn new(config: Config, db: Db) -> Self {
        let rate_limiter = Arc::new(SlidingWindowLimiter::new(config.requests_per_minute));
        tracing::info!(
            "Rate limiter initialized ({} requests per {}s window, {} store)",
            rate_limiter.requests_per_minute(),
            rate_limiter.window().as_secs(),
            db.backend_name()
        );

        Self {
            db,
            config,
            rate_limiter,
        }
    }

    /// State over the in-memory store.
    pub fn in_memory(config: Config) -> Self {
        Self::new(config, Db::memory())
    }
}
