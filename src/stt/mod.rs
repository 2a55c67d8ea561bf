//! Speech-to-text client boundary.
//!
//! The core never implements recognition itself; it consumes the
//! `Transcriber` trait and only cares about the worker-crash vs decode-error
//! distinction that drives the dispatcher's retry policy.

pub mod transcriber;
pub mod whisper;

pub use transcriber::{MockTranscriber, Transcriber};
pub use whisper::{WhisperConfig, WhisperTranscriber, model_path_for};
