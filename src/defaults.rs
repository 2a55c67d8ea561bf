//! Default configuration constants for chatscribe.
//!
//! Shared across the config types and the CLI so the two never drift apart.

/// Default chunk length in seconds.
///
/// Recordings longer than this are split into segments of this length and
/// transcribed in parallel. 30 s matches Whisper's native decode window, so
/// each chunk fits a single forced-language pass.
pub const CHUNK_LENGTH_SECS: f64 = 30.0;

/// Default minimum recording/segment length in seconds.
///
/// Recordings shorter than this are skipped entirely, and a trailing chunk
/// shorter than this is dropped from the plan. Below 5 s there is rarely
/// enough speech to be worth a decode.
pub const MIN_LENGTH_SECS: f64 = 5.0;

/// Default number of dispatch attempts for a recording's chunk batch.
///
/// A worker crash retries the whole batch; after this many attempts every
/// chunk degrades to a placeholder instead of failing the recording.
pub const MAX_RETRIES: u32 = 3;

/// Default Whisper model size for batch runs.
pub const DEFAULT_MODEL: &str = "base";

/// Default ISO 639-1 language code forced during decoding.
pub const DEFAULT_LANGUAGE: &str = "en";

/// Sample rate expected by the transcription engine, in Hz.
pub const SAMPLE_RATE: u32 = 16000;

/// Suffix appended to a recording's stem to name its scratch directory.
pub const SCRATCH_SUFFIX: &str = "_chunks";

/// Default output path for the batch report.
pub const REPORT_PATH: &str = "transcribed.csv";

/// Media probing tool. Its absence is fatal at startup, not per call.
pub const FFPROBE: &str = "ffprobe";

/// Media extraction/decoding tool. Its absence is fatal at startup.
pub const FFMPEG: &str = "ffmpeg";

/// Fixed transcript for recordings below the minimum length.
pub fn short_circuit_notice(min_length_secs: f64) -> String {
    format!(
        "Voice message under {} s. Transcription skipped.",
        min_length_secs
    )
}

/// Per-chunk placeholder emitted when the retry budget is exhausted.
pub fn degraded_placeholder(error: &str) -> String {
    format!("<transcription failed: {}>", error)
}
