//! HTTP request handlers for the Axum web server.
//!
//! Handlers are thin wrappers that delegate to `SongService`.

pub mod songs;
pub mod styles;
pub mod voices;
