//! chatscribe - Batch transcription for chat-export voice messages
//!
//! Reads a chat export directory, transcribes every voice message with
//! chunked parallel Whisper inference, and writes a CSV report mirroring
//! the manifest.

// Enforce error handling discipline
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

pub mod app;
pub mod cli;
pub mod config;
pub mod defaults;
pub mod diagnostics;
pub mod dispatch;
pub mod error;
pub mod manifest;
pub mod media;
pub mod pipeline;
pub mod plan;
pub mod report;
pub mod stt;

// Core seams
pub use media::{CommandExecutor, SystemCommandExecutor};
pub use stt::Transcriber;

// Pipeline
pub use pipeline::{Pipeline, PipelineOptions};

// Error handling
pub use error::{ChatscribeError, Result};

// Config
pub use config::Config;

/// Build version string with optional git commit hash.
///
/// Returns `"0.1.0+abc1234"` when git hash is available, `"0.1.0"` otherwise.
pub fn version_string() -> String {
    let version = env!("CARGO_PKG_VERSION");
    match option_env!("GIT_HASH") {
        Some(hash) if !hash.is_empty() => format!("{}+{}", version, hash),
        _ => version.to_string(),
    }
}
