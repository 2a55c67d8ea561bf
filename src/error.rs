//! Error types for chatscribe.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChatscribeError {
    // Pre-flight errors
    #[error("Required tool not found: {tool}. Install FFmpeg and retry")]
    ToolchainMissing { tool: String },

    // Media toolchain errors
    #[error("{command} failed: {output}")]
    CommandFailed { command: String, output: String },

    #[error("Failed to probe duration of {path}: {output}")]
    MediaProbe { path: String, output: String },

    #[error("Chunk file already exists: {path}")]
    ChunkExists { path: String },

    #[error("Failed to extract chunk {index}: {output}")]
    ChunkExtraction { index: usize, output: String },

    // Transcription errors
    #[error("Transcription worker crashed: {message}")]
    WorkerCrash { message: String },

    #[error("Transcription decode failed: {message}")]
    Decode { message: String },

    #[error("Transcription model not found at {path}")]
    ModelNotFound { path: String },

    // Manifest errors
    #[error("Invalid manifest: {message}")]
    Manifest { message: String },

    #[error("Manifest parse error: {0}")]
    ManifestJson(#[from] serde_json::Error),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    // General I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Generic error for cases not covered above
    #[error("{0}")]
    Other(String),
}

impl ChatscribeError {
    /// Whether this error is in the worker-crash class.
    ///
    /// The dispatcher retries the whole chunk batch on a crash; every other
    /// failure abandons the recording instead.
    pub fn is_worker_crash(&self) -> bool {
        matches!(self, ChatscribeError::WorkerCrash { .. })
    }
}

// Type alias for convenience
pub type Result<T> = std::result::Result<T, ChatscribeError>;
