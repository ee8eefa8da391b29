//! Port definitions (trait abstractions) for external systems.
//!
//! Ports carry no implementation details. Concrete implementations live in
//! adapter crates (`songgram-provider` for synthesis, `songgram-jobs` for job
//! storage).

mod job_repository;
mod provider;

pub use job_repository::{JobRepository, JobSnapshot, RepositoryError};
pub use provider::{
    MusicParams, ProviderError, ProviderErrorClass, ProviderErrorKind, SpeechParams,
    SynthesisProviderPort,
};
