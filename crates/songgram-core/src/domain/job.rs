//! Job identity and lifecycle.
//!
//! A job's status and its audio payload live in one [`JobState`] value, so a
//! reader can never see `Completed` without audio or audio on a non-completed
//! job. All state changes go through [`Job::transition`]; worker outcomes go
//! through [`Job::settle`], which also applies the processing deadline.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use uuid::Uuid;

use super::request::JobRequest;
use crate::ports::ProviderErrorKind;

/// Opaque, unguessable job identifier.
///
/// Generated ids look like `song_1718000000000_3f9a0c1b2d4e`: a millisecond
/// timestamp followed by 12 hex chars of a v4 UUID.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    /// Mint a fresh id for a job created at `now`.
    #[must_use]
    pub fn generate(now: DateTime<Utc>) -> Self {
        let random = Uuid::new_v4().simple().to_string();
        Self(format!("song_{}_{}", now.timestamp_millis(), &random[..12]))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for JobId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for JobId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Which attempt produced the final audio.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GenerationStrategy {
    /// Music composition with the named parameter set.
    Music { config: String },
    /// Spoken narration fallback (text-to-speech).
    Speech,
}

impl fmt::Display for GenerationStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Music { config } => write!(f, "music:{config}"),
            Self::Speech => f.write_str("speech"),
        }
    }
}

/// Output of a successful generation.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletedSong {
    pub audio: Bytes,
    pub resolved_voice_id: String,
    pub voice_substituted: bool,
    pub strategy: GenerationStrategy,
    /// Number of generation calls spent (voice lookup excluded).
    pub provider_calls: u32,
    pub prompt: String,
    pub completed_at: DateTime<Utc>,
}

/// Terminal failure details.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobFailure {
    pub kind: ProviderErrorKind,
    pub reason: String,
    pub provider_calls: u32,
    pub failed_at: DateTime<Utc>,
}

/// Lifecycle state. Everything except `Processing` is terminal.
#[derive(Debug, Clone, PartialEq)]
pub enum JobState {
    Processing,
    Completed(CompletedSong),
    Failed(JobFailure),
    TimedOut { recorded_at: DateTime<Utc> },
}

impl JobState {
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        !matches!(self, Self::Processing)
    }

    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Processing => "processing",
            Self::Completed(_) => "completed",
            Self::Failed(_) => "failed",
            Self::TimedOut { .. } => "timed_out",
        }
    }
}

/// What to do with a generation result that arrives after its job timed out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LateResultPolicy {
    /// Keep the job timed out and drop the payload.
    #[default]
    Discard,
    /// Let a late success replace the timed-out state.
    Accept,
}

/// Rejected lifecycle change.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid job transition: {from} -> {to}")]
pub struct InvalidTransition {
    pub from: &'static str,
    pub to: &'static str,
}

/// A song generation job.
#[derive(Debug, Clone, PartialEq)]
pub struct Job {
    pub id: JobId,
    pub request: JobRequest,
    pub created_at: DateTime<Utc>,
    pub state: JobState,
}

impl Job {
    /// Create a job in the `Processing` state.
    #[must_use]
    pub const fn new(id: JobId, request: JobRequest, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            request,
            created_at,
            state: JobState::Processing,
        }
    }

    /// Move to `next`.
    ///
    /// Only `Processing` may leave its state, with one exception: under
    /// [`LateResultPolicy::Accept`] a `TimedOut` job may become `Completed`.
    pub fn transition(
        &mut self,
        next: JobState,
        late: LateResultPolicy,
    ) -> Result<(), InvalidTransition> {
        let allowed = match (&self.state, &next) {
            (JobState::Processing, JobState::Processing) => false,
            (JobState::Processing, _) => true,
            (JobState::TimedOut { .. }, JobState::Completed(_)) => {
                late == LateResultPolicy::Accept
            }
            _ => false,
        };

        if !allowed {
            return Err(InvalidTransition {
                from: self.state.label(),
                to: next.label(),
            });
        }
        self.state = next;
        Ok(())
    }

    /// Time since creation as seen at `now`. Zero under clock skew.
    #[must_use]
    pub fn elapsed(&self, now: DateTime<Utc>) -> Duration {
        (now - self.created_at).to_std().unwrap_or_default()
    }

    /// Whether the job is past its processing deadline at `now`.
    ///
    /// Exactly at the deadline still counts as on time.
    #[must_use]
    pub fn is_overdue(&self, now: DateTime<Utc>, max_processing: Duration) -> bool {
        self.elapsed(now) > max_processing
    }

    /// Record a worker outcome observed at `now`.
    ///
    /// Under [`LateResultPolicy::Discard`] an overdue job records `TimedOut`
    /// instead of `outcome`, which agrees with what [`derive_status`] has been
    /// reporting since the deadline passed. Callers holding the job behind a
    /// lock must read `now` while holding it.
    ///
    /// [`derive_status`]: crate::domain::derive_status
    pub fn settle(
        &mut self,
        outcome: JobState,
        now: DateTime<Utc>,
        max_processing: Duration,
        late: LateResultPolicy,
    ) -> Result<(), InvalidTransition> {
        let next = if late == LateResultPolicy::Discard
            && self.is_overdue(now, max_processing)
        {
            JobState::TimedOut { recorded_at: now }
        } else {
            outcome
        };
        self.transition(next, late)
    }

    /// Audio payload, present only once completed.
    #[must_use]
    pub const fn audio(&self) -> Option<&Bytes> {
        match &self.state {
            JobState::Completed(song) => Some(&song.audio),
            _ => None,
        }
    }

    #[must_use]
    pub const fn completed_at(&self) -> Option<DateTime<Utc>> {
        match &self.state {
            JobState::Completed(song) => Some(song.completed_at),
            _ => None,
        }
    }
}
