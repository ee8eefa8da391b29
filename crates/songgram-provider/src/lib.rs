#![doc = include_str!("../README.md")]
#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]
// DefaultElevenLabsClient is meant to be used through SynthesisProviderPort,
// not through its internal generic structure
#![allow(private_interfaces)]

mod client;
mod config;
mod error;
mod http;
mod models;
mod port;

// ============================================================================
// Public API
// ============================================================================

// Client
pub use client::DefaultElevenLabsClient;

// Configuration
pub use config::{DEFAULT_BASE_URL, ProviderClientConfig};

// Silence unused dev-dependency warnings
#[cfg(test)]
use tokio as _;
