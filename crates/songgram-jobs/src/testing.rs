//! Scripted synthesis provider for tests.
//!
//! Music responses are consumed in order, one per `compose_music` call; once
//! the script runs out every call succeeds with [`MUSIC_AUDIO`]. Speech and
//! voice responses are fixed. Every call is counted.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;

use songgram_core::{
    DEFAULT_VOICE_ID, MusicParams, ProviderError, SpeechParams, SynthesisProviderPort,
    VoiceDescriptor,
};

/// Audio returned by successful music calls unless scripted otherwise.
pub const MUSIC_AUDIO: &[u8] = b"ID3\x04music-bytes";

/// Audio returned by successful speech calls unless scripted otherwise.
pub const SPEECH_AUDIO: &[u8] = b"ID3\x04speech-bytes";

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

pub struct ScriptedProvider {
    configured: bool,
    delay: Duration,
    voices: Mutex<Result<Vec<VoiceDescriptor>, ProviderError>>,
    music: Mutex<VecDeque<Result<Bytes, ProviderError>>>,
    speech: Mutex<Result<Bytes, ProviderError>>,
    voice_calls: AtomicU32,
    music_calls: AtomicU32,
    speech_calls: AtomicU32,
    music_labels: Mutex<Vec<String>>,
    speech_voices: Mutex<Vec<String>>,
}

impl Default for ScriptedProvider {
    fn default() -> Self {
        Self {
            configured: true,
            delay: Duration::ZERO,
            voices: Mutex::new(Ok(vec![VoiceDescriptor::new(DEFAULT_VOICE_ID, "Rachel")])),
            music: Mutex::new(VecDeque::new()),
            speech: Mutex::new(Ok(Bytes::from_static(SPEECH_AUDIO))),
            voice_calls: AtomicU32::new(0),
            music_calls: AtomicU32::new(0),
            speech_calls: AtomicU32::new(0),
            music_labels: Mutex::new(Vec::new()),
            speech_voices: Mutex::new(Vec::new()),
        }
    }
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report missing credentials from `check_configuration`.
    #[must_use]
    pub fn unconfigured(mut self) -> Self {
        self.configured = false;
        self
    }

    /// Sleep before answering each generation call.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    #[must_use]
    pub fn with_voices(self, voices: Vec<VoiceDescriptor>) -> Self {
        *lock(&self.voices) = Ok(voices);
        self
    }

    #[must_use]
    pub fn with_voices_error(self, err: ProviderError) -> Self {
        *lock(&self.voices) = Err(err);
        self
    }

    /// Responses for successive music calls.
    #[must_use]
    pub fn with_music(self, script: Vec<Result<Bytes, ProviderError>>) -> Self {
        *lock(&self.music) = script.into();
        self
    }

    /// Every music call fails with `err`.
    #[must_use]
    pub fn with_music_failing(self, err: &ProviderError) -> Self {
        self.with_music(vec![Err(err.clone()); 8])
    }

    #[must_use]
    pub fn with_speech(self, response: Result<Bytes, ProviderError>) -> Self {
        *lock(&self.speech) = response;
        self
    }

    pub fn voice_calls(&self) -> u32 {
        self.voice_calls.load(Ordering::SeqCst)
    }

    pub fn music_calls(&self) -> u32 {
        self.music_calls.load(Ordering::SeqCst)
    }

    pub fn speech_calls(&self) -> u32 {
        self.speech_calls.load(Ordering::SeqCst)
    }

    /// Generation calls of either kind.
    pub fn generation_calls(&self) -> u32 {
        self.music_calls() + self.speech_calls()
    }

    /// Parameter-set labels, in call order.
    pub fn music_labels(&self) -> Vec<String> {
        lock(&self.music_labels).clone()
    }

    /// Voice ids passed to speech calls, in call order.
    pub fn speech_voices(&self) -> Vec<String> {
        lock(&self.speech_voices).clone()
    }

    async fn pause(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }
}

#[async_trait]
impl SynthesisProviderPort for ScriptedProvider {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn check_configuration(&self) -> Result<(), ProviderError> {
        if self.configured {
            Ok(())
        } else {
            Err(ProviderError::Configuration(
                "ELEVENLABS_API_KEY is not configured".to_string(),
            ))
        }
    }

    async fn list_voices(&self) -> Result<Vec<VoiceDescriptor>, ProviderError> {
        self.voice_calls.fetch_add(1, Ordering::SeqCst);
        lock(&self.voices).clone()
    }

    async fn compose_music(
        &self,
        _prompt: &str,
        params: &MusicParams,
    ) -> Result<Bytes, ProviderError> {
        self.music_calls.fetch_add(1, Ordering::SeqCst);
        lock(&self.music_labels).push(params.label.clone());
        self.pause().await;
        lock(&self.music)
            .pop_front()
            .unwrap_or_else(|| Ok(Bytes::from_static(MUSIC_AUDIO)))
    }

    async fn synthesize_speech(
        &self,
        _text: &str,
        voice_id: &str,
        _params: &SpeechParams,
    ) -> Result<Bytes, ProviderError> {
        self.speech_calls.fetch_add(1, Ordering::SeqCst);
        lock(&self.speech_voices).push(voice_id.to_string());
        self.pause().await;
        lock(&self.speech).clone()
    }
}
