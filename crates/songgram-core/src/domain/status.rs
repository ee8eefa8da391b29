//! Client-facing job status.
//!
//! [`derive_status`] is a pure function of the stored job, the current time and
//! the processing deadline. A processing job past its deadline reads as
//! timed out even before the worker records it.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;

use super::job::{GenerationStrategy, Job, JobState};
use crate::ports::ProviderErrorKind;

/// MIME type of every audio payload produced by the orchestrator.
pub const AUDIO_CONTENT_TYPE: &str = "audio/mpeg";

/// Which of the four client-visible states a job is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatusKind {
    Processing,
    Completed,
    Failed,
    TimedOut,
}

impl JobStatusKind {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::TimedOut => "timed_out",
        }
    }
}

impl std::fmt::Display for JobStatusKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Status projection returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum JobStatusView {
    #[serde(rename_all = "camelCase")]
    Processing {
        created_at: DateTime<Utc>,
        elapsed_secs: u64,
    },
    #[serde(rename_all = "camelCase")]
    Completed {
        created_at: DateTime<Utc>,
        completed_at: DateTime<Utc>,
        resolved_voice_id: String,
        voice_substituted: bool,
        strategy: GenerationStrategy,
        size_bytes: usize,
    },
    #[serde(rename_all = "camelCase")]
    Failed {
        created_at: DateTime<Utc>,
        error_kind: ProviderErrorKind,
        reason: String,
    },
    #[serde(rename_all = "camelCase")]
    TimedOut {
        created_at: DateTime<Utc>,
        elapsed_secs: u64,
    },
}

impl JobStatusView {
    #[must_use]
    pub const fn kind(&self) -> JobStatusKind {
        match self {
            Self::Processing { .. } => JobStatusKind::Processing,
            Self::Completed { .. } => JobStatusKind::Completed,
            Self::Failed { .. } => JobStatusKind::Failed,
            Self::TimedOut { .. } => JobStatusKind::TimedOut,
        }
    }

    #[must_use]
    pub const fn label(&self) -> &'static str {
        self.kind().label()
    }

    #[must_use]
    pub const fn is_completed(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }
}

/// Project a stored job into its client-facing status.
#[must_use]
pub fn derive_status(job: &Job, now: DateTime<Utc>, max_processing: Duration) -> JobStatusView {
    let created_at = job.created_at;
    let elapsed = job.elapsed(now);

    match &job.state {
        JobState::Processing if job.is_overdue(now, max_processing) => JobStatusView::TimedOut {
            created_at,
            elapsed_secs: elapsed.as_secs(),
        },
        JobState::Processing => JobStatusView::Processing {
            created_at,
            elapsed_secs: elapsed.as_secs(),
        },
        JobState::Completed(song) => JobStatusView::Completed {
            created_at,
            completed_at: song.completed_at,
            resolved_voice_id: song.resolved_voice_id.clone(),
            voice_substituted: song.voice_substituted,
            strategy: song.strategy.clone(),
            size_bytes: song.audio.len(),
        },
        JobState::Failed(failure) => JobStatusView::Failed {
            created_at,
            error_kind: failure.kind,
            reason: failure.reason.clone(),
        },
        JobState::TimedOut { recorded_at } => JobStatusView::TimedOut {
            created_at,
            elapsed_secs: (*recorded_at - created_at)
                .to_std()
                .unwrap_or_default()
                .as_secs(),
        },
    }
}

/// Downloadable audio for a completed job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioArtifact {
    pub bytes: Bytes,
    pub content_type: &'static str,
    pub filename: String,
}
