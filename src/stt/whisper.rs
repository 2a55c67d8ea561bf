//! Whisper-based transcription client.
//!
//! Implements the Transcriber trait with whisper-rs. The model is loaded
//! once at construction and reused for every chunk until process exit; the
//! batch driver shares it across workers behind an `Arc`.
//!
//! # Feature Gate
//!
//! Real inference requires the `whisper` feature (and cmake to build):
//!
//! ```bash
//! cargo build --features whisper
//! ```
//!
//! Without it a stub is compiled that fails on use, so the orchestration
//! layer stays testable on machines without the toolchain.

use crate::defaults;
use crate::error::{ChatscribeError, Result};
use crate::stt::transcriber::Transcriber;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

#[cfg(feature = "whisper")]
use std::sync::{Mutex, Once};
#[cfg(feature = "whisper")]
use whisper_rs::{
    FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters, install_logging_hooks,
};

#[cfg(feature = "whisper")]
static LOGGING_HOOKS_INSTALLED: Once = Once::new();

/// Configuration for the Whisper client.
#[derive(Debug, Clone)]
pub struct WhisperConfig {
    /// Path to the ggml model file
    pub model_path: PathBuf,
    /// ISO 639-1 code forced during decoding (e.g. "en", "ru", "de")
    pub language: String,
    /// Number of threads for inference (None = auto-detect)
    pub threads: Option<usize>,
}

impl Default for WhisperConfig {
    fn default() -> Self {
        Self {
            model_path: model_path_for(defaults::DEFAULT_MODEL),
            language: defaults::DEFAULT_LANGUAGE.to_string(),
            threads: None,
        }
    }
}

/// Cache location for a model size name, e.g. "base" →
/// `~/.cache/chatscribe/models/ggml-base.bin`.
pub fn model_path_for(size: &str) -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("chatscribe")
        .join("models")
        .join(format!("ggml-{}.bin", size))
}

/// Decode a chunk file to 16 kHz mono PCM samples via ffmpeg.
///
/// Chunks are lossless codec copies of the source (typically Opus in Ogg),
/// so they go through the same toolchain the extractor uses before hitting
/// the model. The intermediate WAV lives next to the chunk and is removed
/// after parsing.
pub fn decode_chunk_samples(path: &Path) -> Result<Vec<f32>> {
    let wav_path = path.with_extension("decode.wav");

    let output = Command::new(defaults::FFMPEG)
        .args([
            "-y",
            "-i",
            &path.to_string_lossy(),
            "-ac",
            "1",
            "-ar",
            &defaults::SAMPLE_RATE.to_string(),
            "-acodec",
            "pcm_s16le",
            &wav_path.to_string_lossy(),
        ])
        .output()
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ChatscribeError::ToolchainMissing {
                    tool: defaults::FFMPEG.to_string(),
                }
            } else {
                ChatscribeError::Decode {
                    message: format!("failed to run ffmpeg: {}", e),
                }
            }
        })?;

    if !output.status.success() {
        return Err(ChatscribeError::Decode {
            message: format!(
                "ffmpeg could not decode {}: {}",
                path.display(),
                String::from_utf8_lossy(&output.stderr).trim()
            ),
        });
    }

    let mut reader = hound::WavReader::open(&wav_path).map_err(|e| ChatscribeError::Decode {
        message: format!("invalid decoded WAV: {}", e),
    })?;
    let samples = reader
        .samples::<i16>()
        .map(|s| s.map(|v| v as f32 / 32768.0))
        .collect::<std::result::Result<Vec<f32>, _>>()
        .map_err(|e| ChatscribeError::Decode {
            message: format!("corrupt decoded WAV: {}", e),
        });

    fs::remove_file(&wav_path).ok();
    samples
}

/// Whisper-based transcriber implementation.
///
/// The WhisperContext is wrapped in a Mutex; chunk workers serialize on the
/// model while ffmpeg decoding still runs in parallel.
#[cfg(feature = "whisper")]
pub struct WhisperTranscriber {
    context: Mutex<WhisperContext>,
    config: WhisperConfig,
    model_name: String,
}

#[cfg(feature = "whisper")]
impl std::fmt::Debug for WhisperTranscriber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WhisperTranscriber")
            .field("config", &self.config)
            .field("model_name", &self.model_name)
            .field("context", &"<WhisperContext>")
            .finish()
    }
}

/// Whisper-based transcriber placeholder (without whisper feature).
///
/// Stub implementation that returns errors when used.
#[cfg(not(feature = "whisper"))]
#[derive(Debug)]
pub struct WhisperTranscriber {
    config: WhisperConfig,
    model_name: String,
}

fn model_name_of(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("unknown")
        .to_string()
}

#[cfg(feature = "whisper")]
impl WhisperTranscriber {
    /// Load the model and build a client.
    ///
    /// # Errors
    /// Returns `ModelNotFound` if the model file doesn't exist and `Decode`
    /// if model loading fails.
    pub fn new(config: WhisperConfig) -> Result<Self> {
        // Suppress whisper.cpp output (only once per process)
        LOGGING_HOOKS_INSTALLED.call_once(|| {
            install_logging_hooks();
        });

        if !config.model_path.exists() {
            return Err(ChatscribeError::ModelNotFound {
                path: config.model_path.to_string_lossy().to_string(),
            });
        }

        let model_name = model_name_of(&config.model_path);

        let context_params = WhisperContextParameters::default();
        let context = WhisperContext::new_with_params(
            config.model_path.to_str().ok_or_else(|| ChatscribeError::Decode {
                message: "Invalid UTF-8 in model path".to_string(),
            })?,
            context_params,
        )
        .map_err(|e| ChatscribeError::Decode {
            message: format!("Failed to load Whisper model: {}", e),
        })?;

        Ok(Self {
            context: Mutex::new(context),
            config,
            model_name,
        })
    }

    /// Get the configuration
    pub fn config(&self) -> &WhisperConfig {
        &self.config
    }
}

#[cfg(not(feature = "whisper"))]
impl WhisperTranscriber {
    /// Create a new Whisper transcriber (stub implementation).
    pub fn new(config: WhisperConfig) -> Result<Self> {
        if !config.model_path.exists() {
            return Err(ChatscribeError::ModelNotFound {
                path: config.model_path.to_string_lossy().to_string(),
            });
        }

        let model_name = model_name_of(&config.model_path);
        Ok(Self { config, model_name })
    }

    /// Get the configuration
    pub fn config(&self) -> &WhisperConfig {
        &self.config
    }
}

#[cfg(feature = "whisper")]
impl Transcriber for WhisperTranscriber {
    fn transcribe(&self, audio: &Path) -> Result<String> {
        let samples = decode_chunk_samples(audio)?;

        let context = self.context.lock().map_err(|e| ChatscribeError::Decode {
            message: format!("Failed to acquire context lock: {}", e),
        })?;

        let mut state = context.create_state().map_err(|e| ChatscribeError::Decode {
            message: format!("Failed to create Whisper state: {}", e),
        })?;

        let mut params = FullParams::new(SamplingStrategy::Greedy { best_of: 1 });

        // Forced-language decode; never auto-detect per chunk, otherwise
        // sibling chunks of one recording could disagree
        params.set_language(Some(&self.config.language));

        if let Some(threads) = self.config.threads {
            params.set_n_threads(threads as i32);
        }

        params.set_print_special(false);
        params.set_print_progress(false);
        params.set_print_realtime(false);
        params.set_print_timestamps(false);

        state
            .full(params, &samples)
            .map_err(|e| ChatscribeError::Decode {
                message: format!("Whisper inference failed: {}", e),
            })?;

        let mut transcription = String::new();
        for segment in state.as_iter() {
            transcription.push_str(&segment.to_string());
        }

        Ok(transcription.trim().to_string())
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }

    fn is_ready(&self) -> bool {
        true
    }
}

#[cfg(not(feature = "whisper"))]
impl Transcriber for WhisperTranscriber {
    fn transcribe(&self, _audio: &Path) -> Result<String> {
        Err(ChatscribeError::Decode {
            message: concat!(
                "Whisper feature not enabled. This binary was built without speech recognition.\n",
                "To fix: cargo build --release --features whisper\n",
                "If build fails with cmake errors, install: sudo apt install cmake"
            )
            .to_string(),
        })
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }

    fn is_ready(&self) -> bool {
        false
    }
}
