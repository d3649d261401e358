//! Response construction.
//!
//! # Responsibilities
//! - Build redirect responses with an absolute or path-absolute `Location`
//! - Map pass-through failures to HTTP status codes with a JSON error body
//!
//! # Design Decisions
//! - API errors are always `{"error": "..."}`
//! - Upstream timeouts result in 504 Gateway Timeout, other failures in 502

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// A redirect to `location` with the given 3xx status.
pub fn redirect(status: StatusCode, location: &str) -> Response {
    match HeaderValue::from_str(location) {
        Ok(value) => (status, [(header::LOCATION, value)]).into_response(),
        Err(_) => {
            tracing::warn!(location = %location, "Redirect target is not a valid header value");
            StatusCode::BAD_REQUEST.into_response()
        }
    }
}

/// JSON body of every API error.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Failures of the generation API pass-through.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// No base URL or no API key configured.
    #[error("Generation service is not configured")]
    Disabled,

    /// The requested path cannot be mapped under the API base URL.
    #[error("Invalid generation API path: {0}")]
    InvalidTarget(String),

    #[error("Generation API timed out")]
    Timeout,

    #[error("Generation API request failed: {0}")]
    Upstream(#[source] reqwest::Error),
}

impl GenerationError {
    pub fn status(&self) -> StatusCode {
        match self {
            GenerationError::Disabled => StatusCode::SERVICE_UNAVAILABLE,
            GenerationError::InvalidTarget(_) => StatusCode::BAD_REQUEST,
            GenerationError::Timeout => StatusCode::GATEWAY_TIMEOUT,
            GenerationError::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl From<reqwest::Error> for GenerationError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            GenerationError::Timeout
        } else {
            GenerationError::Upstream(err)
        }
    }
}

impl IntoResponse for GenerationError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}
