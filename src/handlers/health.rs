use axum::{http::StatusCode, response::Response};
use serde::Serialize;

use crate::error::Result;

use super::json_response;

#[derive(Serialize)]
pub struct WelcomeResponse {
    pub message: &'static str,
}

/// Liveness endpoint.
pub async fn health() -> Result<Response> {
    json_response(
        StatusCode::OK,
        &WelcomeResponse {
            message: "Welcome to Workout Log API!",
        },
    )
}
