//! Synthesis provider port.
//!
//! # Design Rules
//!
//! - Parameters here are provider-neutral; the HTTP adapter owns the wire
//!   encoding.
//! - Every failure is a [`ProviderError`] whose [`ProviderErrorClass`]
//!   decides whether the fallback ladder may continue.

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::VoiceDescriptor;

// ── Parameters ───────────────────────────────────────────────────────────────

/// One music composition parameter set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MusicParams {
    /// Short label recorded on the job when this set succeeds.
    pub label: String,
    pub model_id: String,
    pub duration_secs: u32,
    pub temperature: f32,
    pub top_k: u32,
    pub top_p: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classifier_free_guidance: Option<f32>,
}

/// Text-to-speech parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeechParams {
    pub model_id: String,
    pub stability: f32,
    pub similarity_boost: f32,
}

impl Default for SpeechParams {
    fn default() -> Self {
        Self {
            model_id: "eleven_multilingual_v2".to_string(),
            stability: 0.5,
            similarity_boost: 0.75,
        }
    }
}

// ── Errors ───────────────────────────────────────────────────────────────────

/// Whether a failed attempt may be followed by another one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderErrorClass {
    /// Stop the ladder and fail the job.
    Fatal,
    /// The provider disliked the parameters; a different set may work.
    Retryable,
}

/// Serializable discriminant of [`ProviderError`], stored on failed jobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderErrorKind {
    Authentication,
    Configuration,
    MalformedRequest,
    RateLimited,
    EndpointNotFound,
    Unavailable,
    Transport,
    InvalidResponse,
}

/// Failure of a single provider call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    #[error("Provider rejected credentials (HTTP {status})")]
    Authentication { status: u16 },

    #[error("Provider is not configured: {0}")]
    Configuration(String),

    #[error("Provider rejected the request (HTTP {status}): {message}")]
    MalformedRequest { status: u16, message: String },

    #[error("Provider rate limit exceeded, try again later")]
    RateLimited { retry_after_secs: Option<u64> },

    #[error("Provider endpoint not found: {endpoint}")]
    EndpointNotFound { endpoint: String },

    #[error("Provider unavailable (HTTP {status}): {message}")]
    Unavailable { status: u16, message: String },

    #[error("Failed to reach provider: {0}")]
    Transport(String),

    #[error("Invalid provider response: {0}")]
    InvalidResponse(String),
}

impl ProviderError {
    /// Classify a non-success HTTP status.
    pub fn from_status(status: u16, endpoint: &str, body: impl Into<String>) -> Self {
        let message = body.into();
        match status {
            401 | 403 => Self::Authentication { status },
            400 | 422 => Self::MalformedRequest { status, message },
            404 => Self::EndpointNotFound {
                endpoint: endpoint.to_string(),
            },
            429 => Self::RateLimited {
                retry_after_secs: None,
            },
            _ => Self::Unavailable { status, message },
        }
    }

    /// Only malformed-request failures may be retried with other parameters.
    pub const fn class(&self) -> ProviderErrorClass {
        match self {
            Self::MalformedRequest { .. } => ProviderErrorClass::Retryable,
            _ => ProviderErrorClass::Fatal,
        }
    }

    pub const fn kind(&self) -> ProviderErrorKind {
        match self {
            Self::Authentication { .. } => ProviderErrorKind::Authentication,
            Self::Configuration(_) => ProviderErrorKind::Configuration,
            Self::MalformedRequest { .. } => ProviderErrorKind::MalformedRequest,
            Self::RateLimited { .. } => ProviderErrorKind::RateLimited,
            Self::EndpointNotFound { .. } => ProviderErrorKind::EndpointNotFound,
            Self::Unavailable { .. } => ProviderErrorKind::Unavailable,
            Self::Transport(_) => ProviderErrorKind::Transport,
            Self::InvalidResponse(_) => ProviderErrorKind::InvalidResponse,
        }
    }

    /// Credentials or configuration problems.
    pub const fn is_configuration(&self) -> bool {
        matches!(self, Self::Authentication { .. } | Self::Configuration(_))
    }

    /// End-user message that leaks no provider detail.
    pub const fn user_message(&self) -> &'static str {
        match self {
            Self::Authentication { .. } | Self::Configuration(_) => {
                "Song generation is temporarily unavailable"
            }
            Self::MalformedRequest { .. } => {
                "The song request could not be processed by the generation service"
            }
            Self::RateLimited { .. } => "Too many songs are being generated, try again later",
            Self::EndpointNotFound { .. } | Self::Unavailable { .. } | Self::Transport(_) => {
                "The generation service is unavailable, try again later"
            }
            Self::InvalidResponse(_) => "The generation service returned an invalid response",
        }
    }
}

// ── Port ─────────────────────────────────────────────────────────────────────

/// External speech and music synthesis.
#[async_trait]
pub trait SynthesisProviderPort: Send + Sync {
    /// Provider name for logs.
    fn name(&self) -> &'static str;

    /// Fail fast when credentials are missing. Makes no network call.
    fn check_configuration(&self) -> Result<(), ProviderError>;

    /// Fetch the provider's voice catalog.
    async fn list_voices(&self) -> Result<Vec<VoiceDescriptor>, ProviderError>;

    /// Compose music for `prompt` with one parameter set.
    async fn compose_music(&self, prompt: &str, params: &MusicParams)
    -> Result<Bytes, ProviderError>;

    /// Read `text` aloud with `voice_id`.
    async fn synthesize_speech(
        &self,
        text: &str,
        voice_id: &str,
        params: &SpeechParams,
    ) -> Result<Bytes, ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_classification() {
        assert_eq!(
            ProviderError::from_status(401, "/music", "").kind(),
            ProviderErrorKind::Authentication
        );
        assert_eq!(
            ProviderError::from_status(403, "/music", "").kind(),
            ProviderErrorKind::Authentication
        );
        assert_eq!(
            ProviderError::from_status(400, "/music", "bad").kind(),
            ProviderErrorKind::MalformedRequest
        );
        assert_eq!(
            ProviderError::from_status(422, "/music", "bad").kind(),
            ProviderErrorKind::MalformedRequest
        );
        assert_eq!(
            ProviderError::from_status(404, "/music", "").kind(),
            ProviderErrorKind::EndpointNotFound
        );
        assert_eq!(
            ProviderError::from_status(429, "/music", "").kind(),
            ProviderErrorKind::RateLimited
        );
        assert_eq!(
            ProviderError::from_status(503, "/music", "").kind(),
            ProviderErrorKind::Unavailable
        );
        assert_eq!(
            ProviderError::from_status(418, "/music", "").kind(),
            ProviderErrorKind::Unavailable
        );
    }

    #[test]
    fn only_malformed_requests_are_retryable() {
        let retryable = ProviderError::MalformedRequest {
            status: 422,
            message: String::new(),
        };
        assert_eq!(retryable.class(), ProviderErrorClass::Retryable);

        for fatal in [
            ProviderError::Authentication { status: 401 },
            ProviderError::Configuration("missing key".into()),
            ProviderError::RateLimited {
                retry_after_secs: Some(3),
            },
            ProviderError::EndpointNotFound {
                endpoint: "/music".into(),
            },
            ProviderError::Unavailable {
                status: 500,
                message: String::new(),
            },
            ProviderError::Transport("reset".into()),
            ProviderError::InvalidResponse("empty".into()),
        ] {
            assert_eq!(fatal.class(), ProviderErrorClass::Fatal, "{fatal:?}");
        }
    }

    #[test]
    fn user_message_hides_details() {
        let err = ProviderError::Authentication { status: 401 };
        assert_eq!(err.user_message(), "Song generation is temporarily unavailable");
        assert!(err.is_configuration());
    }

    #[test]
    fn kind_serializes_snake_case() {
        let json = serde_json::to_string(&ProviderErrorKind::EndpointNotFound).unwrap();
        assert_eq!(json, "\"endpoint_not_found\"");
    }
}
