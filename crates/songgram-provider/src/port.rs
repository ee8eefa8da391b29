//! `SynthesisProviderPort` implementation for `ElevenLabsClient`.

use async_trait::async_trait;
use bytes::Bytes;
use songgram_core::{
    MusicParams, ProviderError, SpeechParams, SynthesisProviderPort, VoiceDescriptor,
};

use crate::client::ElevenLabsClient;
use crate::error::ElevenLabsError;
use crate::http::HttpBackend;
use crate::models::{MusicRequestBody, SpeechRequestBody, VoicesResponse};

// ============================================================================
// Error Mapping
// ============================================================================

fn map_error(err: ElevenLabsError) -> ProviderError {
    match err {
        ElevenLabsError::Status {
            status: 429,
            retry_after_secs,
            ..
        } => ProviderError::RateLimited { retry_after_secs },
        ElevenLabsError::Status {
            status, url, body, ..
        } => ProviderError::from_status(status, &url, body),
        ElevenLabsError::MissingApiKey => ProviderError::Configuration(err.to_string()),
        ElevenLabsError::EmptyAudio { .. } | ElevenLabsError::JsonParse(_) => {
            ProviderError::InvalidResponse(err.to_string())
        }
        ElevenLabsError::Network(e) => ProviderError::Transport(e.to_string()),
        ElevenLabsError::InvalidUrl(e) => ProviderError::Configuration(e.to_string()),
    }
}

fn log_failure(operation: &'static str, err: &ProviderError) {
    tracing::warn!(
        target: "songgram.provider",
        operation,
        kind = ?err.kind(),
        error = %err,
        "ElevenLabs call failed"
    );
}

// ============================================================================
// Port Implementation
// ============================================================================

#[async_trait]
impl<B: HttpBackend> SynthesisProviderPort for ElevenLabsClient<B> {
    fn name(&self) -> &'static str {
        "elevenlabs"
    }

    fn check_configuration(&self) -> Result<(), ProviderError> {
        if self.has_api_key {
            Ok(())
        } else {
            Err(map_error(ElevenLabsError::MissingApiKey))
        }
    }

    async fn list_voices(&self) -> Result<Vec<VoiceDescriptor>, ProviderError> {
        let url = self.voices_url().map_err(map_error)?;
        let response: VoicesResponse = self.backend.get_json(&url).await.map_err(|e| {
            let err = map_error(e);
            log_failure("list_voices", &err);
            err
        })?;

        let voices: Vec<VoiceDescriptor> = response.voices.into_iter().map(Into::into).collect();
        tracing::debug!(target: "songgram.provider", count = voices.len(), "Fetched voice catalog");
        Ok(voices)
    }

    async fn compose_music(
        &self,
        prompt: &str,
        params: &MusicParams,
    ) -> Result<Bytes, ProviderError> {
        let url = self.music_url().map_err(map_error)?;
        let body = MusicRequestBody::new(prompt, params);

        tracing::debug!(
            target: "songgram.provider",
            config = %params.label,
            duration = params.duration_secs,
            prompt_chars = prompt.chars().count(),
            "Requesting music composition"
        );

        self.backend
            .post_for_audio(&url, &body)
            .await
            .map_err(|e| {
                let err = map_error(e);
                log_failure("compose_music", &err);
                err
            })
    }

    async fn synthesize_speech(
        &self,
        text: &str,
        voice_id: &str,
        params: &SpeechParams,
    ) -> Result<Bytes, ProviderError> {
        let url = self.speech_url(voice_id).map_err(map_error)?;
        let body = SpeechRequestBody::new(text, params);

        tracing::debug!(
            target: "songgram.provider",
            voice_id,
            text_chars = text.chars().count(),
            "Requesting speech synthesis"
        );

        self.backend
            .post_for_audio(&url, &body)
            .await
            .map_err(|e| {
                let err = map_error(e);
                log_failure("synthesize_speech", &err);
                err
            })
    }
}
