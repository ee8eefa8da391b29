//! Voice catalog with a time-bounded cache.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

use songgram_core::{ProviderError, SynthesisProviderPort, VoiceDescriptor};

struct Cached {
    fetched_at: Instant,
    voices: Arc<Vec<VoiceDescriptor>>,
}

/// Provider voice list, reused for `ttl` after each fetch.
///
/// Concurrent callers with a stale cache share one fetch. Failed fetches are
/// not cached.
pub struct VoiceCatalog {
    provider: Arc<dyn SynthesisProviderPort>,
    ttl: Duration,
    cache: Mutex<Option<Cached>>,
}

impl VoiceCatalog {
    /// A zero `ttl` fetches on every call.
    pub fn new(provider: Arc<dyn SynthesisProviderPort>, ttl: Duration) -> Self {
        Self {
            provider,
            ttl,
            cache: Mutex::new(None),
        }
    }

    pub async fn voices(&self) -> Result<Arc<Vec<VoiceDescriptor>>, ProviderError> {
        let mut cache = self.cache.lock().await;

        if let Some(cached) = cache.as_ref() {
            if !self.ttl.is_zero() && cached.fetched_at.elapsed() < self.ttl {
                return Ok(Arc::clone(&cached.voices));
            }
        }

        let voices = Arc::new(self.provider.list_voices().await?);
        tracing::debug!(
            target: "songgram.jobs",
            provider = self.provider.name(),
            count = voices.len(),
            "Refreshed voice catalog"
        );

        if !self.ttl.is_zero() {
            *cache = Some(Cached {
                fetched_at: Instant::now(),
                voices: Arc::clone(&voices),
            });
        }
        Ok(voices)
    }

    /// Whether `voice_id` is offered by the provider.
    pub async fn contains(&self, voice_id: &str) -> Result<bool, ProviderError> {
        Ok(self.voices().await?.iter().any(|v| v.id == voice_id))
    }

    pub async fn invalidate(&self) {
        *self.cache.lock().await = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedProvider;
    use songgram_core::DEFAULT_VOICE_ID;

    fn provider() -> Arc<ScriptedProvider> {
        Arc::new(ScriptedProvider::new().with_voices(vec![
            VoiceDescriptor::new(DEFAULT_VOICE_ID, "Rachel"),
            VoiceDescriptor::new("voice-2", "Adam"),
        ]))
    }

    #[tokio::test]
    async fn caches_within_ttl() {
        let provider = provider();
        let catalog = VoiceCatalog::new(provider.clone(), Duration::from_secs(300));

        assert!(catalog.contains("voice-2").await.unwrap());
        assert!(!catalog.contains("missing").await.unwrap());
        assert_eq!(catalog.voices().await.unwrap().len(), 2);
        assert_eq!(provider.voice_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn refetches_after_ttl() {
        let provider = provider();
        let catalog = VoiceCatalog::new(provider.clone(), Duration::from_secs(10));

        catalog.voices().await.unwrap();
        tokio::time::advance(Duration::from_secs(11)).await;
        catalog.voices().await.unwrap();
        assert_eq!(provider.voice_calls(), 2);
    }

    #[tokio::test]
    async fn zero_ttl_disables_cache() {
        let provider = provider();
        let catalog = VoiceCatalog::new(provider.clone(), Duration::ZERO);

        catalog.voices().await.unwrap();
        catalog.voices().await.unwrap();
        assert_eq!(provider.voice_calls(), 2);
    }

    #[tokio::test]
    async fn failures_are_not_cached() {
        let provider = Arc::new(
            ScriptedProvider::new().with_voices_error(ProviderError::Unavailable {
                status: 503,
                message: String::new(),
            }),
        );
        let catalog = VoiceCatalog::new(provider.clone(), Duration::from_secs(300));

        assert!(catalog.voices().await.is_err());
        assert!(catalog.voices().await.is_err());
        assert_eq!(provider.voice_calls(), 2);
    }

    #[tokio::test]
    async fn invalidate_forces_refetch() {
        let provider = provider();
        let catalog = VoiceCatalog::new(provider.clone(), Duration::from_secs(300));

        catalog.voices().await.unwrap();
        catalog.invalidate().await;
        catalog.voices().await.unwrap();
        assert_eq!(provider.voice_calls(), 2);
    }
}
