//! Command-line interface for chatscribe
//!
//! Provides argument parsing using clap derive macros.

use crate::defaults;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Batch transcription for chat-export voice messages
#[derive(Parser, Debug)]
#[command(
    name = "chatscribe",
    version,
    about = "Batch transcription for chat-export voice messages"
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Chat export directory containing result.json (batch mode)
    #[arg(value_name = "EXPORT_DIR")]
    pub export_dir: Option<PathBuf>,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Suppress progress output (quiet mode)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose output (-v: per-recording transcripts)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Output CSV path for the batch report
    #[arg(long, short = 'o', value_name = "PATH", default_value = defaults::REPORT_PATH)]
    pub output: PathBuf,

    /// Whisper model size (default: base)
    #[arg(long, value_name = "MODEL")]
    pub model: Option<String>,

    /// Language code forced during transcription (e.g. en, ru, de)
    #[arg(long, value_name = "LANG")]
    pub language: Option<String>,

    /// Explicit path to a ggml model file
    #[arg(long, value_name = "PATH")]
    pub model_path: Option<PathBuf>,

    /// Chunk length in seconds for long recordings
    #[arg(long, value_name = "SECONDS")]
    pub chunk_length: Option<f64>,

    /// Minimum recording/chunk length in seconds
    #[arg(long, value_name = "SECONDS")]
    pub min_length: Option<f64>,

    /// Dispatch attempts per recording before degrading
    #[arg(long, value_name = "N")]
    pub max_retries: Option<u32>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the duration of one media file in seconds
    Probe {
        /// Media file to probe
        file: PathBuf,
    },

    /// Split one recording into chunk files and keep them on disk
    Split {
        /// Recording to split
        input: PathBuf,

        /// Directory for the chunk files
        #[arg(long, short = 'o', value_name = "DIR", default_value = ".")]
        output: PathBuf,

        /// Chunk length in seconds
        #[arg(long, short = 'l', value_name = "SECONDS", default_value = "30")]
        chunk_length: f64,

        /// Minimum chunk length in seconds
        #[arg(long, short = 'm', value_name = "SECONDS", default_value = "5")]
        min_length: f64,
    },

    /// Transcribe one recording to stdout
    Transcribe {
        /// Recording to transcribe
        file: PathBuf,

        /// Whisper model size for this one-shot run
        #[arg(long, short = 'm', value_name = "MODEL", default_value = "tiny")]
        model: String,

        /// Language code override
        #[arg(long, short = 'l', value_name = "LANG")]
        language: Option<String>,
    },

    /// Check system dependencies
    Check,
}
