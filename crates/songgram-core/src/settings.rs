//! Orchestrator settings.
//!
//! Every tunable has a documented default. Durations are stored in whole
//! seconds so the struct serializes plainly; use the accessors for
//! [`Duration`] values.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::domain::{DEFAULT_VOICE_ID, LateResultPolicy, MAX_STORY_CHARS};

/// Default maximum processing time before a job reads as timed out (5 minutes).
pub const DEFAULT_MAX_PROCESSING_SECS: u64 = 300;

/// Default advisory estimate returned from submit.
pub const DEFAULT_ESTIMATED_GENERATION_SECS: u64 = 120;

/// Default retention of jobs in memory (1 hour).
pub const DEFAULT_JOB_RETENTION_SECS: u64 = 3600;

/// Default cap on stored jobs.
pub const DEFAULT_MAX_JOBS: usize = 1000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Processing time after which a job is reported as timed out.
    pub max_processing_secs: u64,
    /// Estimate handed back to clients at submit time.
    pub estimated_generation_secs: u64,
    /// Characters of the story quoted in the music prompt.
    pub story_excerpt_chars: usize,
    /// Characters of the music prompt quoted in the narration script.
    pub narration_excerpt_chars: usize,
    /// Voice used when none is requested or the requested one is unknown.
    pub default_voice_id: String,
    /// How long a fetched voice catalog is reused. 0 disables caching.
    pub voice_catalog_ttl_secs: u64,
    /// Age after which a job may be evicted, finished or not. Must be at
    /// least `max_processing_secs`, so an evicted job has already timed out.
    pub job_retention_secs: u64,
    /// Upper bound on stored jobs; oldest are evicted first.
    pub max_jobs: usize,
    pub late_result_policy: LateResultPolicy,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_processing_secs: DEFAULT_MAX_PROCESSING_SECS,
            estimated_generation_secs: DEFAULT_ESTIMATED_GENERATION_SECS,
            story_excerpt_chars: 150,
            narration_excerpt_chars: 200,
            default_voice_id: DEFAULT_VOICE_ID.to_string(),
            voice_catalog_ttl_secs: 300,
            job_retention_secs: DEFAULT_JOB_RETENTION_SECS,
            max_jobs: DEFAULT_MAX_JOBS,
            late_result_policy: LateResultPolicy::Discard,
        }
    }
}

impl Settings {
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_max_processing_secs(mut self, secs: u64) -> Self {
        self.max_processing_secs = secs;
        self
    }

    #[must_use]
    pub fn with_late_result_policy(mut self, policy: LateResultPolicy) -> Self {
        self.late_result_policy = policy;
        self
    }

    #[must_use]
    pub fn with_max_jobs(mut self, max_jobs: usize) -> Self {
        self.max_jobs = max_jobs;
        self
    }

    #[must_use]
    pub fn with_job_retention_secs(mut self, secs: u64) -> Self {
        self.job_retention_secs = secs;
        self
    }

    #[must_use]
    pub fn with_voice_catalog_ttl_secs(mut self, secs: u64) -> Self {
        self.voice_catalog_ttl_secs = secs;
        self
    }

    #[must_use]
    pub const fn max_processing(&self) -> Duration {
        Duration::from_secs(self.max_processing_secs)
    }

    #[must_use]
    pub const fn voice_catalog_ttl(&self) -> Duration {
        Duration::from_secs(self.voice_catalog_ttl_secs)
    }

    #[must_use]
    pub const fn job_retention(&self) -> Duration {
        Duration::from_secs(self.job_retention_secs)
    }
}

/// Settings validation error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    #[error("{0} must be greater than zero")]
    ZeroValue(&'static str),

    #[error("Default voice id cannot be empty")]
    EmptyDefaultVoice,

    #[error("{field} must be at most {max}, got {value}", max = MAX_STORY_CHARS)]
    ExcerptTooLong { field: &'static str, value: usize },

    #[error(
        "job_retention_secs ({retention_secs}) must be at least max_processing_secs ({max_processing_secs})"
    )]
    RetentionShorterThanTimeout {
        retention_secs: u64,
        max_processing_secs: u64,
    },
}

/// Validate settings values.
pub fn validate_settings(settings: &Settings) -> Result<(), SettingsError> {
    for (field, value) in [
        ("max_processing_secs", settings.max_processing_secs),
        ("estimated_generation_secs", settings.estimated_generation_secs),
        ("job_retention_secs", settings.job_retention_secs),
    ] {
        if value == 0 {
            return Err(SettingsError::ZeroValue(field));
        }
    }

    if settings.max_jobs == 0 {
        return Err(SettingsError::ZeroValue("max_jobs"));
    }

    if settings.job_retention_secs < settings.max_processing_secs {
        return Err(SettingsError::RetentionShorterThanTimeout {
            retention_secs: settings.job_retention_secs,
            max_processing_secs: settings.max_processing_secs,
        });
    }

    if settings.default_voice_id.trim().is_empty() {
        return Err(SettingsError::EmptyDefaultVoice);
    }

    for (field, value) in [
        ("story_excerpt_chars", settings.story_excerpt_chars),
        ("narration_excerpt_chars", settings.narration_excerpt_chars),
    ] {
        if value > MAX_STORY_CHARS {
            return Err(SettingsError::ExcerptTooLong { field, value });
        }
    }

    Ok(())
}
