//! Per-recording transcription pipeline.
//!
//! Drives one recording through probe, plan, extract, dispatch, and
//! assembly. The branch is taken on the probed duration:
//!
//! - below the minimum length: a fixed skip notice, no media work at all
//! - below the chunk length: the whole file goes straight to the
//!   transcription client, no scratch directory is ever created
//! - otherwise: chunks are extracted into a scratch directory, dispatched
//!   in parallel, and joined in plan order; the scratch directory is
//!   removed before returning, on the error path too

use crate::defaults;
use crate::dispatch::Dispatcher;
use crate::error::{ChatscribeError, Result};
use crate::media::{ChunkExtractor, CommandExecutor, DurationProber, scratch_dir};
use crate::plan;
use crate::stt::Transcriber;
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// Tuning knobs for one pipeline instance.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub chunk_length_secs: f64,
    pub min_length_secs: f64,
    pub max_retries: u32,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            chunk_length_secs: defaults::CHUNK_LENGTH_SECS,
            min_length_secs: defaults::MIN_LENGTH_SECS,
            max_retries: defaults::MAX_RETRIES,
        }
    }
}

/// Transcribes single recordings end to end.
///
/// Generic over the subprocess seam and the transcription client so the
/// whole flow runs against mocks in tests.
pub struct Pipeline<E: CommandExecutor + Clone, T: Transcriber + 'static> {
    prober: DurationProber<E>,
    extractor: ChunkExtractor<E>,
    dispatcher: Dispatcher<T>,
    transcriber: Arc<T>,
    options: PipelineOptions,
}

impl<E: CommandExecutor + Clone, T: Transcriber + 'static> Pipeline<E, T> {
    pub fn new(executor: E, transcriber: Arc<T>, options: PipelineOptions) -> Self {
        Self {
            prober: DurationProber::new(executor.clone()),
            extractor: ChunkExtractor::new(executor),
            dispatcher: Dispatcher::new(Arc::clone(&transcriber), options.max_retries),
            transcriber,
            options,
        }
    }

    /// Transcribe one recording to a single text.
    ///
    /// An abandoned dispatch (non-retryable worker error) yields an empty
    /// transcript rather than an error; probing and extraction failures
    /// propagate.
    pub async fn transcribe_recording(&self, recording: &Path) -> Result<String> {
        let total = self.prober.probe(recording)?;

        if total < self.options.min_length_secs {
            return Ok(defaults::short_circuit_notice(self.options.min_length_secs));
        }

        if total < self.options.chunk_length_secs {
            return self.transcribe_whole(recording).await;
        }

        let plan = plan::plan(
            total,
            self.options.chunk_length_secs,
            self.options.min_length_secs,
        );
        let scratch = scratch_dir(recording);

        let extracted = self.extractor.extract(recording, &plan, &scratch);
        let chunks = match extracted {
            Ok(chunks) => chunks,
            Err(e) => {
                // Partial chunks must not survive a failed extraction
                fs::remove_dir_all(&scratch).ok();
                return Err(e);
            }
        };

        let texts = self.dispatcher.dispatch(&chunks).await;
        fs::remove_dir_all(&scratch).ok();

        Ok(texts.concat())
    }

    /// Short-recording path: hand the untouched file to the client.
    async fn transcribe_whole(&self, recording: &Path) -> Result<String> {
        let transcriber = Arc::clone(&self.transcriber);
        let path = recording.to_path_buf();
        match tokio::task::spawn_blocking(move || transcriber.transcribe(&path)).await {
            Ok(result) => result,
            Err(join_err) if join_err.is_panic() => Err(ChatscribeError::WorkerCrash {
                message: format!("worker panicked: {}", join_err),
            }),
            Err(join_err) => Err(ChatscribeError::Other(join_err.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::MockCommandExecutor;
    use crate::stt::MockTranscriber;
    use tempfile::TempDir;

    fn pipeline_with(
        executor: MockCommandExecutor,
        transcriber: MockTranscriber,
    ) -> Pipeline<MockCommandExecutor, MockTranscriber> {
        Pipeline::new(executor, Arc::new(transcriber), PipelineOptions::default())
    }

    #[tokio::test]
    async fn test_short_recording_returns_skip_notice_without_media_work() {
        let executor = MockCommandExecutor::new().with_output("ffprobe", "3.2");
        let transcriber = MockTranscriber::new("mock");
        let pipeline = pipeline_with(executor.clone(), transcriber.clone());

        let text = pipeline
            .transcribe_recording(Path::new("voice.ogg"))
            .await
            .unwrap();

        assert_eq!(text, "Voice message under 5 s. Transcription skipped.");
        assert!(executor.calls_for("ffmpeg").is_empty());
        assert_eq!(transcriber.call_count(), 0);
    }

    #[tokio::test]
    async fn test_mid_length_recording_transcribed_whole() {
        let executor = MockCommandExecutor::new().with_output("ffprobe", "12.0");
        let transcriber =
            MockTranscriber::new("mock").with_response_for("voice.ogg", "short and sweet");
        let pipeline = pipeline_with(executor.clone(), transcriber.clone());

        let text = pipeline
            .transcribe_recording(Path::new("voice.ogg"))
            .await
            .unwrap();

        assert_eq!(text, "short and sweet");
        // Straight to the client, no extraction
        assert!(executor.calls_for("ffmpeg").is_empty());
        assert_eq!(transcriber.call_count(), 1);
    }

    #[tokio::test]
    async fn test_long_recording_is_chunked_and_joined_in_order() {
        let temp = TempDir::new().unwrap();
        let recording = temp.path().join("voice_9.ogg");
        std::fs::write(&recording, b"fake ogg").unwrap();

        let executor = MockCommandExecutor::new().with_output("ffprobe", "95.0");
        let transcriber = MockTranscriber::new("mock")
            .with_response_for("voice_9_part001.ogg", "one ")
            .with_response_for("voice_9_part002.ogg", "two ")
            .with_response_for("voice_9_part003.ogg", "three ")
            .with_response_for("voice_9_part004.ogg", "four");
        let pipeline = pipeline_with(executor.clone(), transcriber);

        let text = pipeline.transcribe_recording(&recording).await.unwrap();
        assert_eq!(text, "one two three four");
        assert_eq!(executor.calls_for("ffmpeg").len(), 4);
    }

    #[tokio::test]
    async fn test_scratch_directory_removed_after_success() {
        let temp = TempDir::new().unwrap();
        let recording = temp.path().join("voice.ogg");
        std::fs::write(&recording, b"fake ogg").unwrap();

        let executor = MockCommandExecutor::new().with_output("ffprobe", "95.0");
        let pipeline = pipeline_with(executor, MockTranscriber::new("mock"));

        pipeline.transcribe_recording(&recording).await.unwrap();
        assert!(!scratch_dir(&recording).exists());
    }

    #[tokio::test]
    async fn test_scratch_directory_removed_after_extraction_failure() {
        let temp = TempDir::new().unwrap();
        let recording = temp.path().join("voice.ogg");
        std::fs::write(&recording, b"fake ogg").unwrap();

        let executor = MockCommandExecutor::new()
            .with_output("ffprobe", "95.0")
            .with_output("ffmpeg", "")
            .with_error(
                "ffmpeg",
                ChatscribeError::CommandFailed {
                    command: "ffmpeg".to_string(),
                    output: "Invalid data found when processing input".to_string(),
                },
            );
        let pipeline = pipeline_with(executor, MockTranscriber::new("mock"));

        let result = pipeline.transcribe_recording(&recording).await;
        assert!(matches!(
            result,
            Err(ChatscribeError::ChunkExtraction { index: 1, .. })
        ));
        assert!(!scratch_dir(&recording).exists());
    }

    #[tokio::test]
    async fn test_abandoned_dispatch_yields_empty_transcript() {
        let temp = TempDir::new().unwrap();
        let recording = temp.path().join("voice.ogg");
        std::fs::write(&recording, b"fake ogg").unwrap();

        let executor = MockCommandExecutor::new().with_output("ffprobe", "95.0");
        let transcriber = MockTranscriber::new("mock").with_decode_failure();
        let pipeline = pipeline_with(executor, transcriber);

        let text = pipeline.transcribe_recording(&recording).await.unwrap();
        assert_eq!(text, "");
        assert!(!scratch_dir(&recording).exists());
    }

    #[tokio::test]
    async fn test_exhausted_retries_degrade_to_placeholders() {
        let temp = TempDir::new().unwrap();
        let recording = temp.path().join("voice.ogg");
        std::fs::write(&recording, b"fake ogg").unwrap();

        let executor = MockCommandExecutor::new().with_output("ffprobe", "65.0");
        let transcriber = MockTranscriber::new("mock").with_crash();
        let pipeline = pipeline_with(executor, transcriber);

        let text = pipeline.transcribe_recording(&recording).await.unwrap();
        assert!(text.contains("transcription failed"));
    }

    #[tokio::test]
    async fn test_probe_failure_propagates() {
        let executor = MockCommandExecutor::new().with_error(
            "ffprobe",
            ChatscribeError::CommandFailed {
                command: "ffprobe".to_string(),
                output: "No such file or directory".to_string(),
            },
        );
        let pipeline = pipeline_with(executor, MockTranscriber::new("mock"));

        let result = pipeline.transcribe_recording(Path::new("missing.ogg")).await;
        assert!(matches!(result, Err(ChatscribeError::MediaProbe { .. })));
    }

    #[tokio::test]
    async fn test_whole_file_panic_maps_to_worker_crash() {
        let executor = MockCommandExecutor::new().with_output("ffprobe", "10.0");
        let transcriber = MockTranscriber::new("mock").with_panic();
        let pipeline = pipeline_with(executor, transcriber);

        let result = pipeline.transcribe_recording(Path::new("voice.ogg")).await;
        assert!(result.unwrap_err().is_worker_crash());
    }
}
