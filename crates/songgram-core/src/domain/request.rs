//! Song request intake and validation.
//!
//! `SongRequest` is the raw wire shape. Every field defaults to empty so a
//! missing field surfaces as a field-level validation error instead of a
//! deserialization failure. `validate` turns it into an immutable
//! [`JobRequest`].

use serde::{Deserialize, Serialize};
use std::fmt;

use super::style::MusicStyle;

/// Maximum length of the story field, counted in characters.
pub const MAX_STORY_CHARS: usize = 500;

/// Raw song request as submitted by a client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SongRequest {
    pub occasion: String,
    pub recipient_names: String,
    pub relationship: String,
    pub music_style: String,
    /// Requested narration voice id. Empty means "use the default voice".
    #[serde(alias = "voiceId")]
    pub voice_style: String,
    pub story: String,
}

/// A validated, immutable job request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRequest {
    pub occasion: String,
    pub recipient_names: String,
    pub relationship: String,
    pub music_style: MusicStyle,
    /// `None` when the client did not ask for a specific voice.
    pub voice_id: Option<String>,
    pub story: String,
}

/// A single failing field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Wire name of the field (camelCase).
    pub field: String,
    pub message: String,
}

impl FieldError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// Every field that failed validation, in field order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationErrors(pub Vec<FieldError>);

impl ValidationErrors {
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|e| e.field.as_str())
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

impl SongRequest {
    /// Check every field and produce a [`JobRequest`].
    ///
    /// All failures are collected rather than stopping at the first one.
    pub fn validate(&self) -> Result<JobRequest, ValidationErrors> {
        let mut errors = Vec::new();

        let mut required = |field: &str, value: &str| {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                errors.push(FieldError::new(field, "is required"));
            }
            trimmed.to_string()
        };

        let occasion = required("occasion", &self.occasion);
        let recipient_names = required("recipientNames", &self.recipient_names);
        let relationship = required("relationship", &self.relationship);
        let style_label = required("musicStyle", &self.music_style);
        let story = required("story", &self.story);

        let music_style = if style_label.is_empty() {
            None
        } else {
            match style_label.parse::<MusicStyle>() {
                Ok(style) => Some(style),
                Err(_) => {
                    errors.push(FieldError::new(
                        "musicStyle",
                        format!("'{style_label}' is not a supported style"),
                    ));
                    None
                }
            }
        };

        let story_chars = story.chars().count();
        if story_chars > MAX_STORY_CHARS {
            errors.push(FieldError::new(
                "story",
                format!("must be at most {MAX_STORY_CHARS} characters, got {story_chars}"),
            ));
        }

        let voice = self.voice_style.trim();
        let voice_id = (!voice.is_empty()).then(|| voice.to_string());

        match music_style {
            Some(music_style) if errors.is_empty() => Ok(JobRequest {
                occasion,
                recipient_names,
                relationship,
                music_style,
                voice_id,
                story,
            }),
            _ => Err(ValidationErrors(errors)),
        }
    }
}
