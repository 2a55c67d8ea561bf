//! Parallel dispatch of chunk transcriptions, with whole-batch retry.
//!
//! One blocking worker per chunk, so in-flight concurrency is naturally
//! bounded by the chunk count of the current recording rather than a global
//! cap. Recordings are processed sequentially by the driver, which keeps
//! the process-wide worker bound at `ceil(longest_recording / chunk_length)`.
//!
//! Failure policy per attempt:
//! - a worker crash (the client's crash-class error, or a panic inside the
//!   worker) retries the entire batch, up to `max_retries` attempts total;
//!   on exhaustion every slot degrades to a placeholder embedding the error
//! - any other error abandons the recording immediately with an empty
//!   result sequence
//!
//! Results are re-keyed by chunk index, so completion order never affects
//! transcript order. No per-chunk timeout exists; a hung worker is
//! indistinguishable from a slow one.

use crate::defaults;
use crate::media::Chunk;
use crate::stt::Transcriber;
use std::sync::Arc;
use tokio::task::JoinSet;

/// Outcome of a single fan-out attempt over one recording's chunks.
enum AttemptOutcome {
    Complete(Vec<String>),
    Crashed(String),
    Abandoned,
}

/// Fans out one transcription worker per chunk and reassembles results in
/// chunk-index order.
pub struct Dispatcher<T: Transcriber + 'static> {
    transcriber: Arc<T>,
    max_retries: u32,
}

impl<T: Transcriber + 'static> Dispatcher<T> {
    /// Create a dispatcher sharing the given client across workers.
    pub fn new(transcriber: Arc<T>, max_retries: u32) -> Self {
        Self {
            transcriber,
            max_retries: max_retries.max(1),
        }
    }

    /// Transcribe every chunk, returning one text per chunk index.
    ///
    /// Never fails the recording: exhausted retries degrade to placeholder
    /// strings, non-retryable errors return an empty sequence.
    pub async fn dispatch(&self, chunks: &[Chunk]) -> Vec<String> {
        if chunks.is_empty() {
            return Vec::new();
        }

        let mut last_crash = String::new();
        for _attempt in 0..self.max_retries {
            match self.run_attempt(chunks).await {
                AttemptOutcome::Complete(texts) => return texts,
                AttemptOutcome::Abandoned => return Vec::new(),
                AttemptOutcome::Crashed(message) => last_crash = message,
            }
        }

        // Retry budget exhausted: degrade, never propagate the crash
        chunks
            .iter()
            .map(|_| defaults::degraded_placeholder(&last_crash))
            .collect()
    }

    async fn run_attempt(&self, chunks: &[Chunk]) -> AttemptOutcome {
        let mut workers = JoinSet::new();
        for chunk in chunks {
            let transcriber = Arc::clone(&self.transcriber);
            let path = chunk.path.clone();
            let index = chunk.index;
            workers.spawn_blocking(move || (index, transcriber.transcribe(&path)));
        }

        let mut texts: Vec<Option<String>> = vec![None; chunks.len()];
        let mut crash: Option<String> = None;
        let mut abandoned = false;

        while let Some(joined) = workers.join_next().await {
            match joined {
                Ok((index, Ok(text))) => {
                    if let Some(slot) = texts.get_mut(index) {
                        *slot = Some(text);
                    }
                }
                Ok((_, Err(e))) if e.is_worker_crash() => crash = Some(e.to_string()),
                Ok((_, Err(_))) => abandoned = true,
                Err(join_err) if join_err.is_panic() => {
                    crash = Some(format!("worker panicked: {}", join_err));
                }
                Err(join_err) => crash = Some(join_err.to_string()),
            }
        }

        if abandoned {
            AttemptOutcome::Abandoned
        } else if let Some(message) = crash {
            AttemptOutcome::Crashed(message)
        } else {
            AttemptOutcome::Complete(
                texts
                    .into_iter()
                    .map(|text| text.unwrap_or_default())
                    .collect(),
            )
        }
    }
}
