//! ElevenLabs wire types.

use serde::{Deserialize, Serialize};
use songgram_core::{MusicParams, SpeechParams, VoiceDescriptor};
use std::collections::BTreeMap;

// ============================================================================
// Voices
// ============================================================================

/// `GET /voices` response.
#[derive(Debug, Deserialize)]
pub struct VoicesResponse {
    #[serde(default)]
    pub voices: Vec<ElevenLabsVoice>,
}

#[derive(Debug, Deserialize)]
pub struct ElevenLabsVoice {
    pub voice_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub labels: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub preview_url: Option<String>,
}

impl From<ElevenLabsVoice> for VoiceDescriptor {
    fn from(voice: ElevenLabsVoice) -> Self {
        let labels = voice.labels.unwrap_or_default();
        Self {
            accent: labels.get("accent").cloned(),
            name: if voice.name.is_empty() {
                voice.voice_id.clone()
            } else {
                voice.name
            },
            id: voice.voice_id,
            preview_url: voice.preview_url,
            labels,
        }
    }
}

// ============================================================================
// Music
// ============================================================================

/// `POST /music/generate` body.
#[derive(Debug, Serialize)]
pub struct MusicRequestBody<'a> {
    pub prompt: &'a str,
    pub model_id: &'a str,
    pub duration: u32,
    pub temperature: f32,
    pub top_k: u32,
    pub top_p: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classifier_free_guidance: Option<f32>,
}

impl<'a> MusicRequestBody<'a> {
    pub fn new(prompt: &'a str, params: &'a MusicParams) -> Self {
        Self {
            prompt,
            model_id: &params.model_id,
            duration: params.duration_secs,
            temperature: params.temperature,
            top_k: params.top_k,
            top_p: params.top_p,
            classifier_free_guidance: params.classifier_free_guidance,
        }
    }
}

// ============================================================================
// Text to speech
// ============================================================================

/// `POST /text-to-speech/{voice_id}` body.
#[derive(Debug, Serialize)]
pub struct SpeechRequestBody<'a> {
    pub text: &'a str,
    pub model_id: &'a str,
    pub voice_settings: VoiceSettings,
}

#[derive(Debug, Serialize)]
pub struct VoiceSettings {
    pub stability: f32,
    pub similarity_boost: f32,
}

impl<'a> SpeechRequestBody<'a> {
    pub fn new(text: &'a str, params: &'a SpeechParams) -> Self {
        Self {
            text,
            model_id: &params.model_id,
            voice_settings: VoiceSettings {
                stability: params.stability,
                similarity_boost: params.similarity_boost,
            },
        }
    }
}
