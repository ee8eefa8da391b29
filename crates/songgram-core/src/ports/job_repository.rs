//! Job storage port.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::domain::{InvalidTransition, Job, JobId, JobState, LateResultPolicy};

/// Errors from job storage.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    #[error("Job not found: {0}")]
    NotFound(JobId),

    #[error("Job already exists: {0}")]
    AlreadyExists(JobId),

    #[error(transparent)]
    InvalidTransition(#[from] InvalidTransition),
}

/// A job copy plus the time it was taken.
#[derive(Debug, Clone, PartialEq)]
pub struct JobSnapshot {
    pub job: Job,
    /// Clock reading taken while the job could not change.
    pub observed_at: DateTime<Utc>,
}

/// Keyed job table.
///
/// Implementations must be safe for concurrent use across distinct ids and
/// must apply each update to one job atomically.
///
/// Both [`snapshot`](Self::snapshot) and [`settle`](Self::settle) read the
/// clock inside the job's critical section. A reader that saw a job past its
/// deadline therefore orders before any settle that could still store a
/// late result, and under [`LateResultPolicy::Discard`] that settle records
/// `TimedOut` too.
#[async_trait]
pub trait JobRepository: Send + Sync {
    /// Insert a new job. May evict expired or surplus jobs first.
    async fn create(&self, job: Job) -> Result<(), RepositoryError>;

    /// Copy of a job with the time it was observed. Audio is shared, not copied.
    async fn snapshot(&self, id: &JobId) -> Result<JobSnapshot, RepositoryError>;

    async fn get(&self, id: &JobId) -> Result<Job, RepositoryError> {
        self.snapshot(id).await.map(|snapshot| snapshot.job)
    }

    /// Record a worker outcome through [`Job::settle`], returning the label of
    /// the state actually stored.
    async fn settle(
        &self,
        id: &JobId,
        outcome: JobState,
        max_processing: Duration,
        late: LateResultPolicy,
    ) -> Result<&'static str, RepositoryError>;

    /// Number of stored jobs.
    async fn len(&self) -> usize;

    async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
