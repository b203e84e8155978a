use axum::{
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::middleware_layer::correlation::CorrelationId;

/// Detail returned for every server-side failure.
pub const GENERIC_SERVER_DETAIL: &str = "An unexpected error occurred. Please contact support.";
/// Detail returned when a client exhausts its quota.
pub const RATE_LIMIT_DETAIL: &str = "Rate limit exceeded. Please try again later.";

const PROBLEM_CONTENT_TYPE: &str = "application/problem+json";

/// A single field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    pub field: String,
    pub message: String,
}

impl FieldViolation {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// The application's error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// A referenced entity does not exist.
    #[error("{0}")]
    NotFound(String),

    /// Input failed field constraints.
    #[error("Validation failed: {0:?}")]
    Validation(Vec<FieldViolation>),

    /// The client exceeded its request quota.
    #[error("Rate limit exceeded")]
    RateLimited { retry_after_secs: u64 },

    /// The route exists but not for this method.
    #[error("Method not allowed")]
    MethodNotAllowed,

    /// Any other request the client must change, keeping its own status.
    #[error("{detail}")]
    Client { status: StatusCode, detail: String },

    /// A database error.
    #[error("Database error: {0}")]
    Database(#[from] tokio_postgres::Error),

    /// A connection pool error.
    #[error("Pool error: {0}")]
    Pool(#[from] deadpool_postgres::PoolError),

    /// An I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// An internal server error.
    #[error("Internal server error: {0}")]
    Internal(String),
}

/// A `Result` type that uses `AppError` as the error type.
pub type Result<T> = std::result::Result<T, AppError>;

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            AppError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            AppError::Client { status, .. } => *status,
            AppError::Database(_)
            | AppError::Pool(_)
            | AppError::Io(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// RFC 7807 problem document extended with the request's correlation id.
#[derive(Debug, Clone, Serialize)]
pub struct Problem {
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub status: u16,
    pub detail: String,
    pub correlation_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<FieldViolation>>,
}

impl Problem {
    /// Builds a problem for `status`, stamped with the current correlation id.
    ///
    /// Outside a request scope a fresh id is generated so the field is never empty.
    pub fn new(status: StatusCode, title: impl Into<String>, detail: impl Into<String>) -> Self {
        let correlation_id = CorrelationId::current().unwrap_or_else(CorrelationId::generate);
        Self {
            kind: "about:blank".to_string(),
            title: title.into(),
            status: status.as_u16(),
            detail: detail.into(),
            correlation_id: correlation_id.to_string(),
            errors: None,
        }
    }

    pub fn with_errors(mut self, errors: Vec<FieldViolation>) -> Self {
        self.errors = Some(errors);
        self
    }

    /// The fixed body for unexpected failures.
    pub fn internal() -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal Server Error",
            GENERIC_SERVER_DETAIL,
        )
    }
}

impl IntoResponse for Problem {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let body = sonic_rs::to_string(&self).unwrap_or_else(|e| {
            tracing::error!("Problem serialization failed: {}", e);
            format!(
                r#"{{"type":"about:blank","title":"Internal Server Error","status":500,"detail":"{}","correlation_id":"{}"}}"#,
                GENERIC_SERVER_DETAIL, self.correlation_id
            )
        });

        let mut response = (status, body).into_response();
        response.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static(PROBLEM_CONTENT_TYPE),
        );
        response
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let problem = match self {
            AppError::NotFound(ref msg) => {
                tracing::debug!("Resource not found: {}", msg);
                Problem::new(status, "Not Found", msg.clone())
            }

            AppError::Validation(violations) => {
                tracing::debug!("Validation error: {:?}", violations);
                let detail = sonic_rs::to_string(&violations)
                    .unwrap_or_else(|_| format!("{violations:?}"));
                Problem::new(status, "Validation Error", detail).with_errors(violations)
            }

            AppError::RateLimited { retry_after_secs } => {
                tracing::warn!("Rate limit exceeded");
                let mut response =
                    Problem::new(status, "Too Many Requests", RATE_LIMIT_DETAIL).into_response();
                response
                    .headers_mut()
                    .insert(header::RETRY_AFTER, HeaderValue::from(retry_after_secs));
                return response;
            }

            AppError::MethodNotAllowed => {
                Problem::new(status, "Method Not Allowed", "Method not allowed for this resource")
            }

            AppError::Client { detail, .. } => {
                tracing::debug!("Client error {}: {}", status, detail);
                let title = status.canonical_reason().unwrap_or("Client Error");
                Problem::new(status, title, detail)
            }

            AppError::Database(ref e) => {
                tracing::error!("Database error: {}", e);
                Problem::internal()
            }

            AppError::Pool(ref e) => {
                tracing::error!("Pool error: {}", e);
                Problem::internal()
            }

            AppError::Io(ref e) => {
                tracing::error!("IO error: {}", e);
                Problem::internal()
            }

            AppError::Internal(ref msg) => {
                tracing::error!("Internal error: {}", msg);
                Problem::internal()
            }
        };

        problem.into_response()
    }
}
