//! Caller-facing errors of the orchestrator operations.
//!
//! Provider failures that happen inside a generation task never surface here;
//! they are stored on the job and reported through its status.

use thiserror::Error;

use crate::domain::{JobId, JobStatusKind, ValidationErrors};
use crate::ports::{ProviderError, RepositoryError};

/// Submit rejected before any work was scheduled.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    /// The request failed field validation.
    #[error("Invalid song request: {0}")]
    Validation(ValidationErrors),

    /// Credentials or provider configuration are missing.
    #[error("Song generation is not configured: {0}")]
    Configuration(String),

    /// The job could not be stored.
    #[error("Failed to store job: {0}")]
    Storage(String),
}

impl SubmitError {
    #[must_use]
    pub const fn validation_errors(&self) -> Option<&ValidationErrors> {
        match self {
            Self::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}

impl From<ValidationErrors> for SubmitError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(errors)
    }
}

impl From<ProviderError> for SubmitError {
    fn from(err: ProviderError) -> Self {
        Self::Configuration(err.to_string())
    }
}

impl From<RepositoryError> for SubmitError {
    fn from(err: RepositoryError) -> Self {
        Self::Storage(err.to_string())
    }
}

/// Status lookup failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JobLookupError {
    /// Never issued, or already evicted.
    #[error("Song not found: {0}")]
    NotFound(JobId),
}

/// Audio download failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AudioFetchError {
    #[error("Song not found: {0}")]
    NotFound(JobId),

    /// The job exists but has no audio (yet, or ever).
    #[error("Song {id} is not ready (status: {status})")]
    NotReady { id: JobId, status: JobStatusKind },
}

impl AudioFetchError {
    /// Whether the client should keep polling.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::NotReady {
                status: JobStatusKind::Processing,
                ..
            }
        )
    }
}
