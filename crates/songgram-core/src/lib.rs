#![doc = include_str!("../README.md")]
#![deny(unused_crate_dependencies)]

pub mod domain;
pub mod error;
pub mod ports;
pub mod prompt;
pub mod settings;

// Re-export commonly used types for convenience
pub use domain::{
    AUDIO_CONTENT_TYPE, AudioArtifact, CompletedSong, DEFAULT_VOICE_ID, FieldError,
    GenerationStrategy, InvalidTransition, Job, JobFailure, JobId, JobRequest, JobState,
    JobStatusKind, JobStatusView, LateResultPolicy, MAX_STORY_CHARS, MusicStyle,
    OCCASION_SUGGESTIONS, SongRequest, UnknownStyle, ValidationErrors, VoiceDescriptor,
    derive_status,
};
pub use error::{AudioFetchError, JobLookupError, SubmitError};
pub use ports::{
    JobRepository, JobSnapshot, MusicParams, ProviderError, ProviderErrorClass, ProviderErrorKind,
    RepositoryError, SpeechParams, SynthesisProviderPort,
};
pub use settings::{Settings, SettingsError, validate_settings};
