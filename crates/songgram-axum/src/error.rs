//! Axum-specific error types and mappings.
//!
//! Maps the orchestrator's error enums to HTTP status codes and a uniform
//! JSON body. Provider detail is logged here and never sent to clients.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

use songgram_core::{
    AudioFetchError, JobLookupError, JobStatusKind, ProviderError, ProviderErrorKind,
    SubmitError, ValidationErrors,
};

/// Shown whenever credentials or configuration are the problem.
const UNAVAILABLE_MESSAGE: &str = "Song generation is temporarily unavailable";

/// Axum-specific error type.
#[derive(Debug, Error)]
pub enum HttpError {
    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request (malformed body or query).
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Field-level validation failure.
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    /// The song exists but its audio is not available.
    #[error("{message}")]
    NotReady {
        message: String,
        job_status: JobStatusKind,
        retryable: bool,
    },

    #[error("Too many requests: {0}")]
    RateLimited(String),

    /// Upstream provider failed.
    #[error("Bad gateway: {0}")]
    BadGateway(String),

    /// Service unavailable (missing credentials, provider down).
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// JSON error response body.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
    status: u16,
    /// Stable error type discriminant for client-side handling
    #[serde(skip_serializing_if = "Option::is_none", rename = "type")]
    error_type: Option<String>,
    /// Optional additional metadata for specific error types
    #[serde(skip_serializing_if = "Option::is_none")]
    metadata: Option<serde_json::Value>,
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let (status, message, error_type, metadata) = match self {
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg, None, None),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg, None, None),
            Self::Validation(errors) => {
                let message = format!("Invalid song request: {errors}");
                (
                    StatusCode::BAD_REQUEST,
                    message,
                    Some("VALIDATION".to_string()),
                    Some(serde_json::json!({ "fields": errors.0 })),
                )
            }
            Self::NotReady {
                message,
                job_status,
                retryable,
            } => (
                StatusCode::ACCEPTED,
                message,
                Some("NOT_READY".to_string()),
                Some(serde_json::json!({
                    "songStatus": job_status,
                    "retryable": retryable,
                })),
            ),
            Self::RateLimited(msg) => (StatusCode::TOO_MANY_REQUESTS, msg, None, None),
            Self::BadGateway(msg) => (StatusCode::BAD_GATEWAY, msg, None, None),
            Self::ServiceUnavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg, None, None),
            Self::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg, None, None),
        };

        let body = ErrorBody {
            error: message,
            status: status.as_u16(),
            error_type,
            metadata,
        };

        (status, axum::Json(body)).into_response()
    }
}

impl From<SubmitError> for HttpError {
    fn from(err: SubmitError) -> Self {
        match err {
            SubmitError::Validation(errors) => Self::Validation(errors),
            SubmitError::Configuration(detail) => {
                tracing::error!(target: "songgram.http", %detail, "Submit rejected: not configured");
                Self::ServiceUnavailable(UNAVAILABLE_MESSAGE.to_string())
            }
            SubmitError::Storage(detail) => Self::Internal(detail),
        }
    }
}

impl From<JobLookupError> for HttpError {
    fn from(err: JobLookupError) -> Self {
        Self::NotFound(err.to_string())
    }
}

impl From<AudioFetchError> for HttpError {
    fn from(err: AudioFetchError) -> Self {
        let retryable = err.is_retryable();
        match err {
            AudioFetchError::NotFound(_) => Self::NotFound(err.to_string()),
            AudioFetchError::NotReady { status, .. } => {
                let message = if retryable {
                    "Song is still being generated, keep polling".to_string()
                } else {
                    format!("Song has no audio (status: {status})")
                };
                Self::NotReady {
                    message,
                    job_status: status,
                    retryable,
                }
            }
        }
    }
}

impl From<ProviderError> for HttpError {
    fn from(err: ProviderError) -> Self {
        tracing::warn!(target: "songgram.http", error = %err, "Provider call failed");
        let message = err.user_message().to_string();
        match err.kind() {
            ProviderErrorKind::Authentication | ProviderErrorKind::Configuration => {
                Self::ServiceUnavailable(UNAVAILABLE_MESSAGE.to_string())
            }
            ProviderErrorKind::RateLimited => Self::RateLimited(message),
            ProviderErrorKind::Unavailable | ProviderErrorKind::Transport => {
                Self::ServiceUnavailable(message)
            }
            ProviderErrorKind::MalformedRequest
            | ProviderErrorKind::EndpointNotFound
            | ProviderErrorKind::InvalidResponse => Self::BadGateway(message),
        }
    }
}
