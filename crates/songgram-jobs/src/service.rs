//! Song generation orchestrator.
//!
//! `SongService` is the single entry point for the four client operations.
//! Submit validates synchronously, stores a `Processing` job and hands the
//! provider work to a tracked background task. Everything a task learns is
//! written back through the job repository; nothing it does can fail a
//! caller of submit, status or fetch-audio.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio_util::task::TaskTracker;

use songgram_core::{
    AUDIO_CONTENT_TYPE, AudioArtifact, AudioFetchError, CompletedSong, Job, JobFailure, JobId,
    JobLookupError, JobRepository, JobRequest, JobSnapshot, JobState, JobStatusView,
    LateResultPolicy, ProviderError, RepositoryError, Settings, SongRequest, SubmitError,
    SynthesisProviderPort, VoiceDescriptor, derive_status,
};

use crate::catalog::VoiceCatalog;
use crate::gateway::{GeneratedSong, GenerationFailure, ProviderGateway};
use crate::store::InMemoryJobStore;

/// Returned by a successful submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitReceipt {
    pub job_id: JobId,
    pub created_at: DateTime<Utc>,
    /// Advisory only.
    pub estimated_seconds: u64,
}

pub struct SongService {
    repository: Arc<dyn JobRepository>,
    provider: Arc<dyn SynthesisProviderPort>,
    catalog: Arc<VoiceCatalog>,
    gateway: Arc<ProviderGateway>,
    settings: Settings,
    tracker: TaskTracker,
}

impl SongService {
    /// Wire a service with an in-memory store and the default attempt plan.
    pub fn new(provider: Arc<dyn SynthesisProviderPort>, settings: Settings) -> Self {
        let repository = Arc::new(InMemoryJobStore::new(
            settings.job_retention(),
            settings.max_jobs,
        ));
        let catalog = Arc::new(VoiceCatalog::new(
            Arc::clone(&provider),
            settings.voice_catalog_ttl(),
        ));
        let gateway = ProviderGateway::new(Arc::clone(&provider), Arc::clone(&catalog), &settings);
        Self::from_parts(repository, provider, catalog, gateway, settings)
    }

    pub fn from_parts(
        repository: Arc<dyn JobRepository>,
        provider: Arc<dyn SynthesisProviderPort>,
        catalog: Arc<VoiceCatalog>,
        gateway: ProviderGateway,
        settings: Settings,
    ) -> Self {
        Self {
            repository,
            provider,
            catalog,
            gateway: Arc::new(gateway),
            settings,
            tracker: TaskTracker::new(),
        }
    }

    pub const fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Validate, store and schedule a job. Returns before any provider call.
    pub async fn submit(&self, request: SongRequest) -> Result<SubmitReceipt, SubmitError> {
        let request = request.validate()?;

        if let Err(err) = self.provider.check_configuration() {
            tracing::error!(
                target: "songgram.jobs",
                provider = self.provider.name(),
                error = %err,
                "Rejecting submit: provider not configured"
            );
            return Err(err.into());
        }

        let created_at = Utc::now();
        let job_id = JobId::generate(created_at);
        self.repository
            .create(Job::new(job_id.clone(), request.clone(), created_at))
            .await?;

        tracing::info!(
            target: "songgram.jobs",
            job_id = %job_id,
            style = %request.music_style,
            occasion = %request.occasion,
            custom_voice = request.voice_id.is_some(),
            "Song job submitted"
        );

        let worker = Worker {
            repository: Arc::clone(&self.repository),
            gateway: Arc::clone(&self.gateway),
            max_processing: self.settings.max_processing(),
            late: self.settings.late_result_policy,
        };
        self.tracker.spawn(worker.run(job_id.clone(), request));

        Ok(SubmitReceipt {
            job_id,
            created_at,
            estimated_seconds: self.settings.estimated_generation_secs,
        })
    }

    /// Client-facing status of a job.
    ///
    /// Derived at the snapshot's own clock reading, never at a later one.
    pub async fn status(&self, id: &JobId) -> Result<JobStatusView, JobLookupError> {
        let snapshot = self
            .load(id)
            .await
            .ok_or_else(|| JobLookupError::NotFound(id.clone()))?;
        Ok(self.derive(&snapshot))
    }

    /// Audio of a completed job, byte-for-byte as produced.
    pub async fn fetch_audio(&self, id: &JobId) -> Result<AudioArtifact, AudioFetchError> {
        let snapshot = self
            .load(id)
            .await
            .ok_or_else(|| AudioFetchError::NotFound(id.clone()))?;

        match snapshot.job.audio() {
            Some(bytes) => Ok(AudioArtifact {
                bytes: bytes.clone(),
                content_type: AUDIO_CONTENT_TYPE,
                filename: format!("{id}.mp3"),
            }),
            None => Err(AudioFetchError::NotReady {
                id: id.clone(),
                status: self.derive(&snapshot).kind(),
            }),
        }
    }

    /// Provider voices, served from the catalog cache when fresh.
    pub async fn list_voices(&self) -> Result<Vec<VoiceDescriptor>, ProviderError> {
        self.provider.check_configuration()?;
        let voices = self.catalog.voices().await?;
        Ok(voices.as_ref().clone())
    }

    /// Number of generation tasks still running.
    pub fn in_flight(&self) -> usize {
        self.tracker.len()
    }

    /// Stop accepting work and wait up to `grace` for running tasks.
    ///
    /// Returns `true` when every task finished in time.
    pub async fn shutdown(&self, grace: Duration) -> bool {
        self.tracker.close();
        let pending = self.tracker.len();
        if pending > 0 {
            tracing::info!(target: "songgram.jobs", pending, "Waiting for generation tasks");
        }
        if tokio::time::timeout(grace, self.tracker.wait()).await.is_ok() {
            true
        } else {
            tracing::warn!(
                target: "songgram.jobs",
                abandoned = self.tracker.len(),
                "Shutdown grace period elapsed with tasks still running"
            );
            false
        }
    }

    fn derive(&self, snapshot: &JobSnapshot) -> JobStatusView {
        derive_status(
            &snapshot.job,
            snapshot.observed_at,
            self.settings.max_processing(),
        )
    }

    async fn load(&self, id: &JobId) -> Option<JobSnapshot> {
        match self.repository.snapshot(id).await {
            Ok(snapshot) => Some(snapshot),
            Err(RepositoryError::NotFound(_)) => None,
            Err(err) => {
                tracing::error!(target: "songgram.jobs", job_id = %id, error = %err, "Job lookup failed");
                None
            }
        }
    }
}

// ============================================================================
// Worker
// ============================================================================

struct Worker {
    repository: Arc<dyn JobRepository>,
    gateway: Arc<ProviderGateway>,
    max_processing: Duration,
    late: LateResultPolicy,
}

impl Worker {
    async fn run(self, job_id: JobId, request: JobRequest) {
        let outcome = outcome_state(self.gateway.generate(&job_id, &request).await, Utc::now());
        let produced = outcome.label();

        match self
            .repository
            .settle(&job_id, outcome, self.max_processing, self.late)
            .await
        {
            Ok(stored) if stored != produced => tracing::warn!(
                target: "songgram.jobs",
                job_id = %job_id,
                produced,
                stored,
                "Discarding result that arrived after the deadline"
            ),
            Ok(stored) => tracing::info!(
                target: "songgram.jobs",
                job_id = %job_id,
                state = stored,
                "Song job finished"
            ),
            Err(err) => tracing::warn!(
                target: "songgram.jobs",
                job_id = %job_id,
                error = %err,
                "Could not record job outcome"
            ),
        }
    }
}

/// Terminal state for a generation that finished at `finished_at`.
///
/// The repository still decides whether it lands or the job times out.
fn outcome_state(
    outcome: Result<GeneratedSong, GenerationFailure>,
    finished_at: DateTime<Utc>,
) -> JobState {
    match outcome {
        Ok(song) => JobState::Completed(CompletedSong {
            audio: song.audio,
            resolved_voice_id: song.resolved_voice_id,
            voice_substituted: song.voice_substituted,
            strategy: song.strategy,
            provider_calls: song.provider_calls,
            prompt: song.prompt,
            completed_at: finished_at,
        }),
        Err(failure) => JobState::Failed(JobFailure {
            kind: failure.error.kind(),
            reason: failure.error.user_message().to_string(),
            provider_calls: failure.provider_calls,
            failed_at: finished_at,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MUSIC_AUDIO, SPEECH_AUDIO, ScriptedProvider};
    use bytes::Bytes;
    use songgram_core::{DEFAULT_VOICE_ID, GenerationStrategy, JobStatusKind, ProviderErrorKind};
    use tokio_test::assert_ok;

    fn request() -> SongRequest {
        SongRequest {
            occasion: "Birthday".into(),
            recipient_names: "Sarah".into(),
            relationship: "daughter".into(),
            music_style: "Pop".into(),
            voice_style: String::new(),
            story: "She turns nine and loves the sea.".into(),
        }
    }

    fn service(provider: ScriptedProvider) -> (SongService, Arc<ScriptedProvider>) {
        service_with(provider, Settings::default())
    }

    fn service_with(
        provider: ScriptedProvider,
        settings: Settings,
    ) -> (SongService, Arc<ScriptedProvider>) {
        let provider = Arc::new(provider);
        (SongService::new(provider.clone(), settings), provider)
    }

    async fn wait_for_terminal(service: &SongService, id: &JobId) -> JobStatusView {
        for _ in 0..200 {
            let status = service.status(id).await.unwrap();
            if !matches!(status, JobStatusView::Processing { .. }) {
                return status;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("job {id} never finished");
    }

    #[tokio::test]
    async fn submit_returns_processing_then_completes() {
        let (service, provider) =
            service(ScriptedProvider::new().with_delay(Duration::from_millis(50)));

        let receipt = service.submit(request()).await.unwrap();
        assert!(receipt.job_id.as_str().starts_with("song_"));
        assert_eq!(receipt.estimated_seconds, 120);

        let status = service.status(&receipt.job_id).await.unwrap();
        assert_eq!(status.label(), "processing");

        let status = wait_for_terminal(&service, &receipt.job_id).await;
        match status {
            JobStatusView::Completed {
                resolved_voice_id,
                voice_substituted,
                strategy,
                size_bytes,
                ..
            } => {
                assert_eq!(resolved_voice_id, DEFAULT_VOICE_ID);
                assert!(!voice_substituted);
                assert_eq!(
                    strategy,
                    GenerationStrategy::Music {
                        config: "primary".into()
                    }
                );
                assert_eq!(size_bytes, MUSIC_AUDIO.len());
            }
            other => panic!("expected completed, got {other:?}"),
        }
        assert_eq!(provider.generation_calls(), 1);
    }

    #[tokio::test]
    async fn audio_round_trips_byte_for_byte() {
        let (service, _) = service(ScriptedProvider::new());
        let id = service.submit(request()).await.unwrap().job_id;
        wait_for_terminal(&service, &id).await;

        for _ in 0..3 {
            let artifact = service.fetch_audio(&id).await.unwrap();
            assert_eq!(&artifact.bytes[..], MUSIC_AUDIO);
            assert_eq!(artifact.content_type, "audio/mpeg");
            assert_eq!(artifact.filename, format!("{id}.mp3"));
        }
    }

    #[tokio::test]
    async fn validation_fails_before_any_provider_call() {
        let (service, provider) = service(ScriptedProvider::new());
        let mut bad = request();
        bad.music_style = "Polka".into();

        let err = service.submit(bad).await.unwrap_err();
        let fields: Vec<&str> = err.validation_errors().unwrap().fields().collect();
        assert_eq!(fields, vec!["musicStyle"]);
        assert_eq!(provider.generation_calls(), 0);
        assert_eq!(service.in_flight(), 0);
    }

    #[tokio::test]
    async fn missing_key_fails_fast_at_submit() {
        let (service, provider) = service(ScriptedProvider::new().unconfigured());
        let err = service.submit(request()).await.unwrap_err();
        assert!(matches!(err, SubmitError::Configuration(_)));
        assert_eq!(provider.generation_calls(), 0);

        let err = service.list_voices().await.unwrap_err();
        assert_eq!(err.kind(), ProviderErrorKind::Configuration);
        assert_eq!(provider.voice_calls(), 0);
    }

    #[tokio::test]
    async fn unknown_ids_are_not_found() {
        let (service, _) = service(ScriptedProvider::new());
        let id = JobId::from("song_0_000000000000");
        assert_eq!(
            service.status(&id).await.unwrap_err(),
            JobLookupError::NotFound(id.clone())
        );
        assert_eq!(
            service.fetch_audio(&id).await.unwrap_err(),
            AudioFetchError::NotFound(id)
        );
    }

    #[tokio::test]
    async fn fetch_before_completion_is_not_ready() {
        let (service, _) =
            service(ScriptedProvider::new().with_delay(Duration::from_millis(200)));
        let id = service.submit(request()).await.unwrap().job_id;

        let err = service.fetch_audio(&id).await.unwrap_err();
        assert!(matches!(
            err,
            AudioFetchError::NotReady {
                status: JobStatusKind::Processing,
                ..
            }
        ));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn repeated_status_reads_stay_processing() {
        let (service, provider) =
            service(ScriptedProvider::new().with_delay(Duration::from_millis(500)));
        let id = service.submit(request()).await.unwrap().job_id;

        let mut last_elapsed = 0;
        for _ in 0..5 {
            match service.status(&id).await.unwrap() {
                JobStatusView::Processing { elapsed_secs, .. } => {
                    assert!(elapsed_secs >= last_elapsed);
                    last_elapsed = elapsed_secs;
                }
                other => panic!("expected processing, got {other:?}"),
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert_eq!(provider.generation_calls(), 1);
    }

    #[tokio::test]
    async fn auth_failure_marks_job_failed() {
        let (service, provider) = service(
            ScriptedProvider::new()
                .with_music_failing(&ProviderError::Authentication { status: 401 }),
        );
        let id = service.submit(request()).await.unwrap().job_id;

        match wait_for_terminal(&service, &id).await {
            JobStatusView::Failed {
                error_kind, reason, ..
            } => {
                assert_eq!(error_kind, ProviderErrorKind::Authentication);
                assert_eq!(reason, "Song generation is temporarily unavailable");
            }
            other => panic!("expected failed, got {other:?}"),
        }
        assert_eq!(provider.generation_calls(), 1);
        assert!(matches!(
            service.fetch_audio(&id).await,
            Err(AudioFetchError::NotReady {
                status: JobStatusKind::Failed,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn speech_fallback_is_recorded() {
        let (service, _) = service(ScriptedProvider::new().with_music_failing(
            &ProviderError::MalformedRequest {
                status: 422,
                message: String::new(),
            },
        ));
        let id = service.submit(request()).await.unwrap().job_id;

        let status = wait_for_terminal(&service, &id).await;
        assert!(matches!(
            status,
            JobStatusView::Completed {
                strategy: GenerationStrategy::Speech,
                ..
            }
        ));
        assert_eq!(&service.fetch_audio(&id).await.unwrap().bytes[..], SPEECH_AUDIO);
    }

    #[tokio::test]
    async fn concurrent_submissions_do_not_interfere() {
        let (service, provider) =
            service(ScriptedProvider::new().with_delay(Duration::from_millis(20)));
        let service = Arc::new(service);

        let mut ids = Vec::new();
        for _ in 0..10 {
            ids.push(service.submit(request()).await.unwrap().job_id);
        }
        for id in &ids {
            assert!(wait_for_terminal(&service, id).await.is_completed());
        }
        assert_eq!(provider.generation_calls(), 10);
    }

    #[tokio::test]
    async fn shutdown_waits_for_in_flight_work() {
        let (service, _) =
            service(ScriptedProvider::new().with_delay(Duration::from_millis(50)));
        let id = service.submit(request()).await.unwrap().job_id;

        assert!(service.shutdown(Duration::from_secs(5)).await);
        assert_eq!(service.in_flight(), 0);
        assert!(service.status(&id).await.unwrap().is_completed());
    }

    #[tokio::test]
    async fn list_voices_uses_catalog() {
        let (service, provider) = service(ScriptedProvider::new());
        let voices = service.list_voices().await.unwrap();
        assert_eq!(voices[0].id, DEFAULT_VOICE_ID);
        assert_ok!(service.list_voices().await);
        assert_eq!(provider.voice_calls(), 1);
    }

    #[tokio::test]
    async fn late_result_is_discarded_by_default() {
        let settings = Settings::default().with_max_processing_secs(1);
        let (service, _) = service_with(
            ScriptedProvider::new().with_delay(Duration::from_millis(1200)),
            settings,
        );
        let id = service.submit(request()).await.unwrap().job_id;
        service.shutdown(Duration::from_secs(5)).await;

        assert_eq!(service.status(&id).await.unwrap().label(), "timed_out");
        assert!(matches!(
            service.fetch_audio(&id).await,
            Err(AudioFetchError::NotReady {
                status: JobStatusKind::TimedOut,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn late_result_is_kept_when_accepted() {
        let settings = Settings::default()
            .with_max_processing_secs(1)
            .with_late_result_policy(LateResultPolicy::Accept);
        let (service, _) = service_with(
            ScriptedProvider::new().with_delay(Duration::from_millis(1200)),
            settings,
        );
        let id = service.submit(request()).await.unwrap().job_id;
        service.shutdown(Duration::from_secs(5)).await;

        assert!(service.status(&id).await.unwrap().is_completed());
        assert_ok!(service.fetch_audio(&id).await);
    }

    fn generated() -> GeneratedSong {
        GeneratedSong {
            audio: Bytes::from_static(b"abc"),
            strategy: GenerationStrategy::Speech,
            resolved_voice_id: "v".into(),
            voice_substituted: true,
            provider_calls: 4,
            prompt: "p".into(),
        }
    }

    #[test]
    fn successful_outcome_carries_song_and_finish_time() {
        let finished_at = Utc::now();
        let state = outcome_state(Ok(generated()), finished_at);
        match state {
            JobState::Completed(song) => {
                assert_eq!(song.completed_at, finished_at);
                assert_eq!(&song.audio[..], b"abc");
                assert!(song.voice_substituted);
                assert_eq!(song.provider_calls, 4);
            }
            other => panic!("expected completed, got {other:?}"),
        }
    }

    #[test]
    fn failed_outcome_keeps_kind_and_user_message() {
        let finished_at = Utc::now();
        let failure = GenerationFailure {
            error: ProviderError::Transport("reset".into()),
            provider_calls: 1,
        };
        match outcome_state(Err(failure), finished_at) {
            JobState::Failed(failure) => {
                assert_eq!(failure.kind, ProviderErrorKind::Transport);
                assert_eq!(failure.failed_at, finished_at);
                assert!(!failure.reason.contains("reset"));
            }
            other => panic!("expected failed, got {other:?}"),
        }
    }
}
