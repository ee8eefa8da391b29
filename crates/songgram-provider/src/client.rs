//! ElevenLabs client.

use url::Url;

use crate::config::{DEFAULT_BASE_URL, ProviderClientConfig};
use crate::error::ElevenLabsResult;
use crate::http::{HttpBackend, ReqwestBackend};

// ============================================================================
// Type Aliases
// ============================================================================

/// ElevenLabs client over the reqwest backend.
pub type DefaultElevenLabsClient = ElevenLabsClient<ReqwestBackend>;

// ============================================================================
// Client
// ============================================================================

/// Client for the ElevenLabs API, generic over its HTTP backend.
///
/// Use [`DefaultElevenLabsClient`] in production and talk to it through
/// `SynthesisProviderPort`.
pub struct ElevenLabsClient<B: HttpBackend> {
    pub(crate) backend: B,
    pub(crate) base_url: Url,
    pub(crate) has_api_key: bool,
}

impl DefaultElevenLabsClient {
    pub fn new(config: &ProviderClientConfig) -> Self {
        let backend = ReqwestBackend::new(config);
        Self::with_backend(config, backend)
    }
}

impl<B: HttpBackend> ElevenLabsClient<B> {
    /// Build a client around a custom backend.
    pub(crate) fn with_backend(config: &ProviderClientConfig, backend: B) -> Self {
        let base_url = Url::parse(config.base_url.trim_end_matches('/')).unwrap_or_else(|err| {
            tracing::warn!(
                target: "songgram.provider",
                base_url = %config.base_url,
                error = %err,
                "Invalid provider base URL, using default"
            );
            Url::parse(DEFAULT_BASE_URL).expect("default URL is valid")
        });

        Self {
            backend,
            base_url,
            has_api_key: config.has_api_key(),
        }
    }

    /// Append path segments to the base URL. Segments are percent-encoded.
    pub(crate) fn endpoint(&self, segments: &[&str]) -> ElevenLabsResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    pub(crate) fn voices_url(&self) -> ElevenLabsResult<Url> {
        self.endpoint(&["voices"])
    }

    pub(crate) fn music_url(&self) -> ElevenLabsResult<Url> {
        self.endpoint(&["music", "generate"])
    }

    pub(crate) fn speech_url(&self, voice_id: &str) -> ElevenLabsResult<Url> {
        self.endpoint(&["text-to-speech", voice_id])
    }
}
