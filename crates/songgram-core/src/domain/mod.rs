//! Core domain types.
//!
//! These types represent the pure domain model, independent of any
//! infrastructure concerns (HTTP, provider SDKs, storage).
//!
//! # Structure
//!
//! - `request` - Raw and validated song requests
//! - `style` - Music style catalog and occasion suggestions
//! - `job` - Job identity, lifecycle state and transitions
//! - `status` - Client-facing status projection
//! - `voice` - Narration voice descriptors

mod job;
mod request;
mod status;
mod style;
mod voice;

pub use job::{
    CompletedSong, GenerationStrategy, InvalidTransition, Job, JobFailure, JobId, JobState,
    LateResultPolicy,
};
pub use request::{FieldError, JobRequest, MAX_STORY_CHARS, SongRequest, ValidationErrors};
pub use status::{AUDIO_CONTENT_TYPE, AudioArtifact, JobStatusKind, JobStatusView, derive_status};
pub use style::{MusicStyle, OCCASION_SUGGESTIONS, UnknownStyle};
pub use voice::{DEFAULT_VOICE_ID, VoiceDescriptor};
