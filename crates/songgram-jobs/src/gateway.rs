//! Provider gateway: voice resolution and the fallback ladder.
//!
//! The ladder is data: an [`AttemptPlan`] lists parameter sets in order and a
//! single loop walks it. A retryable failure moves to the next attempt; any
//! other failure ends the run.

use std::sync::Arc;

use bytes::Bytes;
use thiserror::Error;

use songgram_core::prompt::{music_prompt, narration_prompt};
use songgram_core::{
    GenerationStrategy, JobId, JobRequest, MusicParams, ProviderError, ProviderErrorClass,
    Settings, SpeechParams, SynthesisProviderPort,
};

use crate::catalog::VoiceCatalog;

/// Upper bound on generation calls for one job. The voice lookup is not
/// counted.
pub const MAX_GENERATION_CALLS: usize = 4;

const MUSIC_MODEL_ID: &str = "eleven_music_v1";

// ============================================================================
// Attempt plan
// ============================================================================

/// One rung of the fallback ladder.
#[derive(Debug, Clone, PartialEq)]
pub enum Attempt {
    Music(MusicParams),
    Speech(SpeechParams),
}

impl Attempt {
    fn strategy(&self) -> GenerationStrategy {
        match self {
            Self::Music(params) => GenerationStrategy::Music {
                config: params.label.clone(),
            },
            Self::Speech(_) => GenerationStrategy::Speech,
        }
    }
}

/// Ordered attempts, capped at [`MAX_GENERATION_CALLS`].
#[derive(Debug, Clone, PartialEq)]
pub struct AttemptPlan {
    attempts: Vec<Attempt>,
}

impl AttemptPlan {
    /// Attempts beyond [`MAX_GENERATION_CALLS`] are dropped.
    pub fn new(mut attempts: Vec<Attempt>) -> Self {
        if attempts.len() > MAX_GENERATION_CALLS {
            tracing::warn!(
                target: "songgram.jobs",
                requested = attempts.len(),
                max = MAX_GENERATION_CALLS,
                "Attempt plan truncated"
            );
            attempts.truncate(MAX_GENERATION_CALLS);
        }
        Self { attempts }
    }

    /// Three music parameter sets, then spoken narration.
    pub fn music_then_speech() -> Self {
        let music = |label: &str,
                     duration_secs: u32,
                     temperature: f32,
                     top_k: u32,
                     top_p: f32,
                     cfg: Option<f32>| {
            Attempt::Music(MusicParams {
                label: label.to_string(),
                model_id: MUSIC_MODEL_ID.to_string(),
                duration_secs,
                temperature,
                top_k,
                top_p,
                classifier_free_guidance: cfg,
            })
        };

        Self::new(vec![
            music("primary", 60, 0.7, 40, 0.8, Some(3.0)),
            music("alternative-1", 30, 0.5, 20, 0.9, None),
            music("alternative-2", 45, 0.6, 30, 0.85, None),
            Attempt::Speech(SpeechParams::default()),
        ])
    }

    pub fn attempts(&self) -> &[Attempt] {
        &self.attempts
    }

    pub fn len(&self) -> usize {
        self.attempts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attempts.is_empty()
    }
}

impl Default for AttemptPlan {
    fn default() -> Self {
        Self::music_then_speech()
    }
}

// ============================================================================
// Results
// ============================================================================

/// Successful generation.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedSong {
    pub audio: Bytes,
    pub strategy: GenerationStrategy,
    pub resolved_voice_id: String,
    pub voice_substituted: bool,
    pub provider_calls: u32,
    /// Text sent with the successful call.
    pub prompt: String,
}

/// Failed generation with the call count spent on it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{error}")]
pub struct GenerationFailure {
    pub error: ProviderError,
    pub provider_calls: u32,
}

/// Voice chosen for narration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedVoice {
    pub id: String,
    pub substituted: bool,
}

// ============================================================================
// Gateway
// ============================================================================

pub struct ProviderGateway {
    provider: Arc<dyn SynthesisProviderPort>,
    catalog: Arc<VoiceCatalog>,
    plan: AttemptPlan,
    default_voice_id: String,
    story_excerpt_chars: usize,
    narration_excerpt_chars: usize,
}

impl ProviderGateway {
    pub fn new(
        provider: Arc<dyn SynthesisProviderPort>,
        catalog: Arc<VoiceCatalog>,
        settings: &Settings,
    ) -> Self {
        Self {
            provider,
            catalog,
            plan: AttemptPlan::default(),
            default_voice_id: settings.default_voice_id.clone(),
            story_excerpt_chars: settings.story_excerpt_chars,
            narration_excerpt_chars: settings.narration_excerpt_chars,
        }
    }

    #[must_use]
    pub fn with_plan(mut self, plan: AttemptPlan) -> Self {
        self.plan = plan;
        self
    }

    /// Pick the narration voice.
    ///
    /// An empty request uses the default without asking the provider. An
    /// unknown voice, or a catalog that cannot be read, falls back to the
    /// default. Rejected credentials are fatal.
    pub async fn resolve_voice(
        &self,
        job_id: &JobId,
        requested: Option<&str>,
    ) -> Result<ResolvedVoice, ProviderError> {
        let Some(requested) = requested.filter(|v| !v.is_empty()) else {
            return Ok(ResolvedVoice {
                id: self.default_voice_id.clone(),
                substituted: false,
            });
        };

        let substitute = ResolvedVoice {
            id: self.default_voice_id.clone(),
            substituted: true,
        };

        match self.catalog.contains(requested).await {
            Ok(true) => Ok(ResolvedVoice {
                id: requested.to_string(),
                substituted: false,
            }),
            Ok(false) => {
                tracing::info!(
                    target: "songgram.jobs",
                    job_id = %job_id,
                    requested,
                    fallback = %substitute.id,
                    "Requested voice not in catalog, using default"
                );
                Ok(substitute)
            }
            Err(err) if err.is_configuration() => Err(err),
            Err(err) => {
                tracing::warn!(
                    target: "songgram.jobs",
                    job_id = %job_id,
                    error = %err,
                    "Voice catalog unavailable, using default voice"
                );
                Ok(substitute)
            }
        }
    }

    /// Run the fallback ladder for one job.
    pub async fn generate(
        &self,
        job_id: &JobId,
        request: &JobRequest,
    ) -> Result<GeneratedSong, GenerationFailure> {
        let voice = self
            .resolve_voice(job_id, request.voice_id.as_deref())
            .await
            .map_err(|error| GenerationFailure {
                error,
                provider_calls: 0,
            })?;

        let music = music_prompt(request, self.story_excerpt_chars);
        let mut calls: u32 = 0;
        let mut last_error =
            ProviderError::Configuration("no generation attempts configured".into());

        for (index, attempt) in self.plan.attempts().iter().enumerate() {
            calls += 1;
            let (result, prompt) = match attempt {
                Attempt::Music(params) => (
                    self.provider.compose_music(&music, params).await,
                    music.clone(),
                ),
                Attempt::Speech(params) => {
                    let script = narration_prompt(request, &music, self.narration_excerpt_chars);
                    (
                        self.provider.synthesize_speech(&script, &voice.id, params).await,
                        script,
                    )
                }
            };

            match result {
                Ok(audio) => {
                    let strategy = attempt.strategy();
                    tracing::info!(
                        target: "songgram.jobs",
                        job_id = %job_id,
                        attempt = index + 1,
                        strategy = %strategy,
                        bytes = audio.len(),
                        "Generation succeeded"
                    );
                    return Ok(GeneratedSong {
                        audio,
                        strategy,
                        resolved_voice_id: voice.id,
                        voice_substituted: voice.substituted,
                        provider_calls: calls,
                        prompt,
                    });
                }
                Err(err) => {
                    let class = err.class();
                    tracing::warn!(
                        target: "songgram.jobs",
                        job_id = %job_id,
                        attempt = index + 1,
                        strategy = %attempt.strategy(),
                        kind = ?err.kind(),
                        retryable = class == ProviderErrorClass::Retryable,
                        "Generation attempt failed"
                    );
                    if class == ProviderErrorClass::Fatal {
                        return Err(GenerationFailure {
                            error: err,
                            provider_calls: calls,
                        });
                    }
                    last_error = err;
                }
            }
        }

        Err(GenerationFailure {
            error: last_error,
            provider_calls: calls,
        })
    }
}
