//! Per-client rate limiting in front of the router.

use std::net::SocketAddr;
use std::time::Instant;

use axum::{
    body::Body,
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::{error::AppError, rate_limit::Decision, state::AppState};

/// Derives the rate limit key for a request.
///
/// The first `X-Forwarded-For` entry wins, then the socket peer address.
/// `X-Forwarded-For` is client-controlled: unless a trusted reverse proxy
/// overwrites it, any direct client can pick its own key and bypass the limit.
///
/// # Arguments
///
/// * `req` - The incoming request.
///
/// # Returns
///
/// The client key, or "unknown" if neither source is available.
pub fn client_key(req: &Request<Body>) -> String {
    req.headers()
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|forwarded| forwarded.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .map(str::to_string)
        .or_else(|| {
            req.extensions()
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ci| ci.0.ip().to_string())
        })
        .unwrap_or_else(|| "unknown".to_string())
}

/// A middleware that applies the per-client sliding window.
///
/// Rejected requests never reach the router.
///
/// # Arguments
///
/// * `state` - The application state.
/// * `req` - The incoming request.
/// * `next` - The next middleware in the chain.
///
/// # Returns
///
/// The inner `Response`, or a 429 problem.
pub async fn enforce_rate_limit(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let key = client_key(&req);

    match state.rate_limiter.admit(&key, Instant::now()) {
        Decision::Admitted { remaining } => {
            tracing::trace!(client = %key, remaining, "Request admitted");
            next.run(req).await
        }
        Decision::Rejected { retry_after } => {
            tracing::warn!(client = %key, "Rate limit exceeded");
            // Round up so clients never retry early.
            let retry_after_secs = retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0);
            AppError::RateLimited { retry_after_secs }.into_response()
        }
    }
}
