//! Workout log HTTP API: exercises, workouts and sets, behind a per-client
//! rate limit, with RFC 7807 problem responses that carry a correlation id.

pub mod app;
pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod file_safety;
pub mod handlers;
pub mod logging;
pub mod middleware_layer;
pub mod models;
pub mod rate_limit;
pub mod repositories;
pub mod services;
pub mod state;
pub mod validation;

pub use app::build_router;
pub use config::Config;
pub use error::{AppError, Problem, Result};
pub use state::AppState;
