//! Batch transcription application entry points.
//!
//! Orchestrates the complete export-to-report flow:
//! load manifest → transcribe voice messages → write report

use crate::config::Config;
use crate::defaults;
use crate::diagnostics::ensure_toolchain;
use crate::error::Result;
use crate::manifest::{self, ManifestEntry};
use crate::media::{ChunkExtractor, CommandExecutor, DurationProber, SystemCommandExecutor};
use crate::pipeline::{Pipeline, PipelineOptions};
use crate::plan;
use crate::report::{self, ReportRow};
use crate::stt::{Transcriber, WhisperConfig, WhisperTranscriber, model_path_for};
use owo_colors::OwoColorize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

fn pipeline_options(config: &Config) -> PipelineOptions {
    PipelineOptions {
        chunk_length_secs: config.chunking.chunk_length_secs,
        min_length_secs: config.chunking.min_length_secs,
        max_retries: config.dispatch.max_retries,
    }
}

fn create_transcriber(config: &Config) -> Result<WhisperTranscriber> {
    let model_path = config
        .stt
        .model_path
        .clone()
        .unwrap_or_else(|| model_path_for(&config.stt.model));
    WhisperTranscriber::new(WhisperConfig {
        model_path,
        language: config.stt.language.clone(),
        threads: None,
    })
}

/// Transcribe every voice message of an already-loaded manifest.
///
/// Returns one report row per manifest entry, in manifest order. A failed
/// recording never aborts the batch: its transcript slot carries the error
/// in angle brackets and the driver moves on.
pub async fn transcribe_manifest<E, T>(
    pipeline: &Pipeline<E, T>,
    entries: &[ManifestEntry],
    quiet: bool,
    verbosity: u8,
) -> Vec<ReportRow>
where
    E: CommandExecutor + Clone,
    T: Transcriber + 'static,
{
    let voice_total = entries
        .iter()
        .filter(|e| matches!(e, ManifestEntry::Voice(_)))
        .count();
    let mut voice_done = 0usize;

    let mut rows = Vec::with_capacity(entries.len());
    for entry in entries {
        let message = entry.message();
        let transcript = match entry {
            ManifestEntry::Voice(voice) => {
                voice_done += 1;
                if !quiet {
                    eprintln!(
                        "[{}/{}] {}",
                        voice_done,
                        voice_total,
                        voice.path.display()
                    );
                }
                match pipeline.transcribe_recording(&voice.path).await {
                    Ok(text) => {
                        if verbosity >= 1 && !quiet {
                            eprintln!("  {}", text.dimmed());
                        }
                        text
                    }
                    Err(e) => {
                        if !quiet {
                            eprintln!("  {}", format!("failed: {}", e).red());
                        }
                        format!("<{}>", e)
                    }
                }
            }
            ManifestEntry::Other(_) => String::new(),
        };

        rows.push(ReportRow {
            id: message.id,
            date: message.date.clone(),
            from: message.from.clone().unwrap_or_default(),
            media_type: message.media_type.clone().unwrap_or_default(),
            file: message.file.clone().unwrap_or_default(),
            text: message.plain_text(),
            transcript,
        });
    }
    rows
}

/// Run the batch command: transcribe an entire chat export to a CSV report.
pub async fn run_batch_command(
    config: Config,
    export_dir: &Path,
    output: &Path,
    quiet: bool,
    verbosity: u8,
) -> Result<()> {
    ensure_toolchain()?;

    let entries = manifest::load_manifest(export_dir)?;
    let voice_count = entries
        .iter()
        .filter(|e| matches!(e, ManifestEntry::Voice(_)))
        .count();

    if !quiet {
        eprintln!(
            "Loaded {} messages ({} voice) from {}",
            entries.len(),
            voice_count,
            export_dir.display()
        );
        eprintln!("Loading model '{}'...", config.stt.model);
    }

    let transcriber = Arc::new(create_transcriber(&config)?);
    let pipeline = Pipeline::new(
        SystemCommandExecutor::new(),
        transcriber,
        pipeline_options(&config),
    );

    let started = Instant::now();
    let rows = transcribe_manifest(&pipeline, &entries, quiet, verbosity).await;
    report::write_csv(output, &rows)?;

    if !quiet {
        let failed = rows
            .iter()
            .filter(|r| r.transcript.starts_with('<'))
            .count();
        let elapsed = started.elapsed();
        eprintln!(
            "{} {} voice messages in {:.1}s → {}",
            "Done:".green(),
            voice_count,
            elapsed.as_secs_f64(),
            output.display()
        );
        if failed > 0 {
            eprintln!("{}", format!("{} recordings degraded or failed", failed).yellow());
        }
    }

    Ok(())
}

/// Run the probe command: print the duration of one media file.
pub fn run_probe_command(file: &Path) -> Result<()> {
    ensure_toolchain()?;
    let duration = DurationProber::system().probe(file)?;
    println!("{:.3}", duration);
    Ok(())
}

/// Run the split command: extract chunks of one recording to a directory
/// and leave them on disk.
pub fn run_split_command(
    input: &Path,
    output_dir: &Path,
    chunk_length: f64,
    min_length: f64,
) -> Result<()> {
    ensure_toolchain()?;

    let duration = DurationProber::system().probe(input)?;
    let plan = plan::plan(duration, chunk_length, min_length);
    if plan.is_empty() {
        println!("{}", defaults::short_circuit_notice(min_length));
        return Ok(());
    }

    let chunks = ChunkExtractor::system().extract(input, &plan, output_dir)?;
    for chunk in &chunks {
        println!(
            "{}  [{:.1}s – {:.1}s]",
            chunk.path.display(),
            chunk.start,
            chunk.end
        );
    }
    println!("{} chunks written to {}", chunks.len(), output_dir.display());
    Ok(())
}

/// Run the transcribe command: one recording straight to stdout.
pub async fn run_transcribe_command(config: Config, file: &Path, quiet: bool) -> Result<()> {
    ensure_toolchain()?;

    if !quiet {
        eprintln!("Loading model '{}'...", config.stt.model);
    }
    let transcriber = Arc::new(create_transcriber(&config)?);
    let pipeline = Pipeline::new(
        SystemCommandExecutor::new(),
        transcriber,
        pipeline_options(&config),
    );

    let text = pipeline.transcribe_recording(file).await?;
    println!("{}", text);
    Ok(())
}

/// Apply CLI overrides on top of the loaded configuration.
pub fn apply_cli_overrides(
    mut config: Config,
    model: Option<String>,
    language: Option<String>,
    model_path: Option<PathBuf>,
    chunk_length: Option<f64>,
    min_length: Option<f64>,
    max_retries: Option<u32>,
) -> Config {
    if let Some(m) = model {
        config.stt.model = m;
    }
    if let Some(l) = language {
        config.stt.language = l;
    }
    if let Some(p) = model_path {
        config.stt.model_path = Some(p);
    }
    if let Some(c) = chunk_length {
        config.chunking.chunk_length_secs = c;
    }
    if let Some(m) = min_length {
        config.chunking.min_length_secs = m;
    }
    if let Some(r) = max_retries {
        config.dispatch.max_retries = r;
    }
    config
}
