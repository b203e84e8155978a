pub mod exercises;
pub mod health;
pub mod workouts;

use axum::{
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::error::{AppError, Result};

/// Serializes `payload` with sonic-rs into a JSON response.
pub(crate) fn json_response<T: Serialize>(status: StatusCode, payload: &T) -> Result<Response> {
    let body = sonic_rs::to_string(payload)
        .map_err(|e| AppError::Internal(format!("Response serialization failed: {e}")))?;

    let mut response = (status, body).into_response();
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    Ok(response)
}

/// Fallback for unknown routes.
pub async fn not_found() -> AppError {
    AppError::NotFound("Resource not found".to_string())
}

/// Fallback for known routes hit with an unsupported method.
pub async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}
