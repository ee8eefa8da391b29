#![doc = include_str!("../README.md")]
#![deny(unused_crate_dependencies)]

mod catalog;
mod gateway;
mod service;
mod store;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

// ============================================================================
// Public API
// ============================================================================

pub use catalog::VoiceCatalog;
pub use gateway::{
    Attempt, AttemptPlan, GeneratedSong, GenerationFailure, MAX_GENERATION_CALLS,
    ProviderGateway, ResolvedVoice,
};
pub use service::{SongService, SubmitReceipt};
pub use store::InMemoryJobStore;
