//! Request-scoped correlation identifier.
//!
//! The id is held in tokio task-local storage while the inner service runs,
//! so logging and error formatting can read it through
//! [`CorrelationId::current`] without threading it through every call.
//! Task-locals are not inherited by spawned tasks; wrap spawned work in
//! [`CorrelationId::scope`] if it needs the id.

use std::fmt;
use std::future::Future;

use axum::{
    body::Body,
    extract::Request,
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use tokio::task_local;
use tracing::Instrument;
use uuid::Uuid;

/// Header carrying the correlation id in both directions.
pub static CORRELATION_HEADER: HeaderName = HeaderName::from_static("x-correlation-id");

const MAX_INBOUND_LEN: usize = 128;

task_local! {
    static CORRELATION_ID: CorrelationId;
}

/// Per-request correlation identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorrelationId(String);

impl CorrelationId {
    /// Generates a fresh random identifier (UUIDv4 text).
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Accepts an inbound header value if it is 1 to 128 visible ASCII characters.
    pub fn parse_inbound(raw: &str) -> Option<Self> {
        let well_formed = !raw.is_empty()
            && raw.len() <= MAX_INBOUND_LEN
            && raw.bytes().all(|b| b.is_ascii_graphic());
        well_formed.then(|| Self(raw.to_string()))
    }

    /// Returns the identifier of the request being handled on this task, if any.
    pub fn current() -> Option<Self> {
        CORRELATION_ID.try_with(Clone::clone).ok()
    }

    /// Runs `fut` with `id` as the current identifier.
    pub async fn scope<Fut>(id: CorrelationId, fut: Fut) -> Fut::Output
    where
        Fut: Future,
    {
        CORRELATION_ID.scope(id, fut).await
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Resolves the request's correlation id, runs the rest of the stack with it
/// in scope, and writes it to the `X-Correlation-ID` response header.
///
/// # Arguments
///
/// * `req` - The incoming request.
/// * `next` - The next middleware in the chain.
///
/// # Returns
///
/// The inner `Response` with the correlation header attached.
pub async fn propagate_correlation_id(req: Request<Body>, next: Next) -> Response {
    let id = req
        .headers()
        .get(&CORRELATION_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(CorrelationId::parse_inbound)
        .unwrap_or_else(CorrelationId::generate);

    let span = tracing::info_span!("correlation", correlation_id = %id);

    let mut response = CorrelationId::scope(id.clone(), next.run(req))
        .instrument(span)
        .await;

    // Ids are either generated UUIDs or pre-checked visible ASCII.
    if let Ok(value) = HeaderValue::from_str(id.as_str()) {
        response.headers_mut().insert(CORRELATION_HEADER.clone(), value);
    }

    response
}
