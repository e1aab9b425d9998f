//! Error types and HTTP error response handling.
//!
//! This module defines the gateway's failure taxonomy and how page-level
//! failures are converted into HTTP responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::{
    models::outcome::{Failure, Outcome},
    services::gateway::OperationDescriptor,
};

/// Everything that can go wrong during one backend call.
///
/// None of these reach the user as-is: [`GatewayError::to_outcome`] turns
/// each into a fixed, user-facing message and the detail is only logged.
///
/// # Error Categories
///
/// - **Connection**: refused, unresolved or timed out
/// - **Request**: any other client failure, or a non-2xx status
/// - **Encode / Decode**: JSON that could not be produced or understood
/// - **Rejected**: the backend answered with a failure flag or fail-code
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("backend unreachable: {0}")]
    Connection(#[source] reqwest::Error),

    #[error("backend request failed: {0}")]
    Request(#[source] reqwest::Error),

    #[error("backend answered with status {0}")]
    Status(reqwest::StatusCode),

    #[error("could not encode request body: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("could not decode response body: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("backend rejected the request: {0:?}")]
    Rejected(#[from] Failure),
}

impl GatewayError {
    /// Classify a `reqwest` failure; connect and timeout errors are transport failures.
    pub fn from_transport(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() {
            GatewayError::Connection(err)
        } else {
            GatewayError::Request(err)
        }
    }

    /// The outcome shown to the user for this failure.
    pub fn to_outcome(&self, descriptor: &OperationDescriptor) -> Outcome {
        match self {
            GatewayError::Connection(_) => Outcome::connection_error(descriptor.connection_title),
            GatewayError::Rejected(failure) => {
                Outcome::rejected(descriptor.rejection_title, failure)
            }
            GatewayError::Request(_)
            | GatewayError::Status(_)
            | GatewayError::Encode(_)
            | GatewayError::Decode(_) => Outcome::request_error(),
        }
    }
}

/// Application-wide error type for failures outside the gateway.
///
/// Gateway failures are never surfaced here; they become outcomes on the
/// page. What remains is the page itself failing to render.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A page template failed to render.
    ///
    /// Returns HTTP 500 Internal Server Error.
    #[error("Template error: {0}")]
    Template(#[from] minijinja::Error),

    /// Submitted form values could not be turned into template input.
    ///
    /// Returns HTTP 500 Internal Server Error.
    #[error("Form values error: {0}")]
    FormValues(#[from] serde_json::Error),
}

/// Convert AppError into an HTTP response.
///
/// # Response Format
///
/// ```json
/// {
///   "error": {
///     "code": "internal_error",
///     "message": "An internal error occurred"
///   }
/// }
/// ```
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AppError::Template(ref err) => {
                tracing::error!("Failed to render page: {err:#}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                )
            }
            AppError::FormValues(ref err) => {
                tracing::error!("Failed to read form values: {err}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
