//! In-memory job table.
//!
//! # Concurrency Model
//!
//! - The outer map lock is held only to insert, evict or clone an entry handle.
//! - Each job sits behind its own lock, so writes to one job never block
//!   reads or writes of another.
//! - A job's status and audio change together under its lock.
//! - Snapshots and settles read the clock while holding the job's lock, so a
//!   late result can never replace a timed-out reading under
//!   [`LateResultPolicy::Discard`].

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use tokio::sync::RwLock;

use songgram_core::{
    Job, JobId, JobRepository, JobSnapshot, JobState, LateResultPolicy, RepositoryError,
};

struct Entry {
    created_at: DateTime<Utc>,
    job: Arc<RwLock<Job>>,
}

/// Process-lifetime job storage with lazy eviction.
///
/// On every `create`, jobs older than the retention window are dropped
/// whatever their state, then the oldest jobs are dropped until there is room
/// for the new one.
pub struct InMemoryJobStore {
    jobs: RwLock<HashMap<JobId, Entry>>,
    retention: Duration,
    max_jobs: usize,
}

impl InMemoryJobStore {
    pub fn new(retention: Duration, max_jobs: usize) -> Self {
        Self {
            jobs: RwLock::new(HashMap::new()),
            retention,
            max_jobs: max_jobs.max(1),
        }
    }

    async fn handle(&self, id: &JobId) -> Result<Arc<RwLock<Job>>, RepositoryError> {
        self.jobs
            .read()
            .await
            .get(id)
            .map(|entry| Arc::clone(&entry.job))
            .ok_or_else(|| RepositoryError::NotFound(id.clone()))
    }

    /// Drop expired jobs, then the oldest ones, leaving room for one insert.
    fn evict(&self, jobs: &mut HashMap<JobId, Entry>, now: DateTime<Utc>) -> usize {
        let before = jobs.len();

        if let Ok(retention) = TimeDelta::from_std(self.retention) {
            let cutoff = now - retention;
            jobs.retain(|_, entry| entry.created_at >= cutoff);
        }

        if jobs.len() >= self.max_jobs {
            let mut by_age: Vec<(DateTime<Utc>, JobId)> = jobs
                .iter()
                .map(|(id, entry)| (entry.created_at, id.clone()))
                .collect();
            by_age.sort();
            let surplus = jobs.len() + 1 - self.max_jobs;
            for (_, id) in by_age.into_iter().take(surplus) {
                jobs.remove(&id);
            }
        }

        before - jobs.len()
    }
}

#[async_trait]
impl JobRepository for InMemoryJobStore {
    async fn create(&self, job: Job) -> Result<(), RepositoryError> {
        let mut jobs = self.jobs.write().await;
        if jobs.contains_key(&job.id) {
            return Err(RepositoryError::AlreadyExists(job.id));
        }

        let evicted = self.evict(&mut jobs, job.created_at);
        if evicted > 0 {
            tracing::debug!(target: "songgram.jobs", evicted, remaining = jobs.len(), "Evicted jobs");
        }

        jobs.insert(
            job.id.clone(),
            Entry {
                created_at: job.created_at,
                job: Arc::new(RwLock::new(job)),
            },
        );
        Ok(())
    }

    async fn snapshot(&self, id: &JobId) -> Result<JobSnapshot, RepositoryError> {
        let handle = self.handle(id).await?;
        let job = handle.read().await;
        Ok(JobSnapshot {
            job: job.clone(),
            observed_at: Utc::now(),
        })
    }

    async fn settle(
        &self,
        id: &JobId,
        outcome: JobState,
        max_processing: Duration,
        late: LateResultPolicy,
    ) -> Result<&'static str, RepositoryError> {
        let handle = self.handle(id).await?;
        let mut job = handle.write().await;
        job.settle(outcome, Utc::now(), max_processing, late)?;
        Ok(job.state.label())
    }

    async fn len(&self) -> usize {
        self.jobs.read().await.len()
    }
}
