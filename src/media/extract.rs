//! Chunk extraction: materialize planned boundaries as segment files.
//!
//! Each interval becomes one physical file in the recording's scratch
//! directory via a lossless codec copy (no re-encode). Boundaries are
//! second-granular, which is sufficient for a forced-language decode.

use crate::defaults;
use crate::error::{ChatscribeError, Result};
use crate::media::executor::{CommandExecutor, SystemCommandExecutor};
use crate::plan::ChunkPlan;
use std::fs;
use std::path::{Path, PathBuf};

/// A materialized segment of one recording.
///
/// Owned exclusively by the pipeline run that created it; deleted together
/// with the scratch directory once its text has been consumed.
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    /// 0-based plan index, the ordering key for reassembly.
    pub index: usize,
    pub path: PathBuf,
    pub start: f64,
    pub end: f64,
}

impl Chunk {
    /// Nominal duration in seconds.
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// Scratch directory for a recording, derived from its own path so two
/// recordings can never share one.
pub fn scratch_dir(recording: &Path) -> PathBuf {
    let stem = recording
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "recording".to_string());
    let dir_name = format!("{}{}", stem, defaults::SCRATCH_SUFFIX);
    match recording.parent() {
        Some(parent) => parent.join(dir_name),
        None => PathBuf::from(dir_name),
    }
}

/// Writes one segment file per planned interval.
#[derive(Debug, Clone)]
pub struct ChunkExtractor<E: CommandExecutor> {
    executor: E,
}

impl<E: CommandExecutor> ChunkExtractor<E> {
    pub fn new(executor: E) -> Self {
        Self { executor }
    }

    /// Extract every interval of `plan` from `recording` into `output_dir`.
    ///
    /// The directory is created if absent. Chunk files are named
    /// `{base_name}_part{index+1:03}.{ext}` and never overwritten: an
    /// existing target fails with `ChunkExists` rather than truncating.
    /// Any ffmpeg failure aborts the whole stage with `ChunkExtraction`;
    /// chunks written before the failure stay on disk until the assembler's
    /// cleanup runs.
    pub fn extract(
        &self,
        recording: &Path,
        plan: &ChunkPlan,
        output_dir: &Path,
    ) -> Result<Vec<Chunk>> {
        fs::create_dir_all(output_dir)?;

        let base_name = recording
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "recording".to_string());
        let extension = recording
            .extension()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "ogg".to_string());
        let recording_str = recording.to_string_lossy();

        let mut chunks = Vec::with_capacity(plan.len());
        for interval in plan.intervals() {
            let file_name = format!("{}_part{:03}.{}", base_name, interval.index + 1, extension);
            let out_path = output_dir.join(file_name);

            if out_path.exists() {
                return Err(ChatscribeError::ChunkExists {
                    path: out_path.to_string_lossy().to_string(),
                });
            }

            let start = interval.start.to_string();
            let end = interval.end.to_string();
            let out_str = out_path.to_string_lossy().to_string();

            self.executor
                .execute(
                    defaults::FFMPEG,
                    &[
                        "-n",
                        "-i",
                        &recording_str,
                        "-acodec",
                        "copy",
                        "-ss",
                        &start,
                        "-to",
                        &end,
                        &out_str,
                    ],
                )
                .map_err(|e| match e {
                    ChatscribeError::CommandFailed { output, .. } => {
                        ChatscribeError::ChunkExtraction {
                            index: interval.index,
                            output,
                        }
                    }
                    other => other,
                })?;

            chunks.push(Chunk {
                index: interval.index,
                path: out_path,
                start: interval.start,
                end: interval.end,
            });
        }

        Ok(chunks)
    }
}

impl ChunkExtractor<SystemCommandExecutor> {
    /// Create an extractor using the system ffmpeg.
    pub fn system() -> Self {
        Self::new(SystemCommandExecutor::new())
    }
}
