use crate::error::{ChatscribeError, Result};
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Trait for speech-to-text transcription of a segment file.
///
/// This trait allows swapping implementations (real Whisper vs mock). The
/// dispatcher only relies on the error split: `WorkerCrash` (and a panic in
/// the worker) drives the retry policy, any other error abandons the
/// recording.
pub trait Transcriber: Send + Sync {
    /// Transcribe one audio file to text.
    fn transcribe(&self, audio: &Path) -> Result<String>;

    /// Get the name of the loaded model
    fn model_name(&self) -> &str;

    /// Check if the transcriber is ready
    fn is_ready(&self) -> bool;
}

/// Implement Transcriber for Arc<T> to allow sharing across workers.
impl<T: Transcriber> Transcriber for Arc<T> {
    fn transcribe(&self, audio: &Path) -> Result<String> {
        (**self).transcribe(audio)
    }

    fn model_name(&self) -> &str {
        (**self).model_name()
    }

    fn is_ready(&self) -> bool {
        (**self).is_ready()
    }
}

/// How the mock fails, if at all.
#[derive(Debug, Clone, Copy, PartialEq)]
enum FailureMode {
    None,
    Decode,
    Crash,
    Panic,
}

#[derive(Debug)]
struct MockState {
    response: Mutex<String>,
    /// Per-file overrides, keyed by file name.
    responses: Mutex<HashMap<String, String>>,
    /// Per-file artificial latency in milliseconds, keyed by file name.
    delays: Mutex<HashMap<String, u64>>,
    mode: Mutex<FailureMode>,
    /// When set, only this many calls fail before the mock recovers.
    failure_budget: AtomicU32,
    budget_limited: Mutex<bool>,
    calls: AtomicUsize,
}

/// Mock transcriber for testing the dispatcher and pipeline.
#[derive(Debug, Clone)]
pub struct MockTranscriber {
    model_name: String,
    state: Arc<MockState>,
}

impl MockTranscriber {
    /// Create a new mock transcriber with default settings
    pub fn new(model_name: &str) -> Self {
        Self {
            model_name: model_name.to_string(),
            state: Arc::new(MockState {
                response: Mutex::new("mock transcription".to_string()),
                responses: Mutex::new(HashMap::new()),
                delays: Mutex::new(HashMap::new()),
                mode: Mutex::new(FailureMode::None),
                failure_budget: AtomicU32::new(0),
                budget_limited: Mutex::new(false),
                calls: AtomicUsize::new(0),
            }),
        }
    }

    /// Configure the mock to return a specific response
    pub fn with_response(self, response: &str) -> Self {
        *self.state.response.lock().unwrap() = response.to_string();
        self
    }

    /// Configure a response for a specific file name
    pub fn with_response_for(self, file_name: &str, response: &str) -> Self {
        self.state
            .responses
            .lock()
            .unwrap()
            .insert(file_name.to_string(), response.to_string());
        self
    }

    /// Sleep before responding for a specific file name, to control
    /// completion order in dispatch tests
    pub fn with_delay_for(self, file_name: &str, millis: u64) -> Self {
        self.state
            .delays
            .lock()
            .unwrap()
            .insert(file_name.to_string(), millis);
        self
    }

    /// Configure the mock to fail with a decode error
    pub fn with_decode_failure(self) -> Self {
        *self.state.mode.lock().unwrap() = FailureMode::Decode;
        self
    }

    /// Configure the mock to fail with a worker-crash error
    pub fn with_crash(self) -> Self {
        *self.state.mode.lock().unwrap() = FailureMode::Crash;
        self
    }

    /// Configure the mock to panic inside transcribe
    pub fn with_panic(self) -> Self {
        *self.state.mode.lock().unwrap() = FailureMode::Panic;
        self
    }

    /// Limit the configured failure mode to the first `calls` invocations;
    /// later calls succeed. Models a transient crash that a retry recovers.
    pub fn with_failure_budget(self, calls: u32) -> Self {
        self.state.failure_budget.store(calls, Ordering::SeqCst);
        *self.state.budget_limited.lock().unwrap() = true;
        self
    }

    /// Total number of transcribe calls observed.
    pub fn call_count(&self) -> usize {
        self.state.calls.load(Ordering::SeqCst)
    }

    fn should_fail_now(&self) -> bool {
        if !*self.state.budget_limited.lock().unwrap() {
            return true;
        }
        self.state
            .failure_budget
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |remaining| {
                remaining.checked_sub(1)
            })
            .is_ok()
    }
}

impl Transcriber for MockTranscriber {
    fn transcribe(&self, audio: &Path) -> Result<String> {
        self.state.calls.fetch_add(1, Ordering::SeqCst);

        let file_name = audio
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        let delay = self.state.delays.lock().unwrap().get(&file_name).copied();
        if let Some(millis) = delay {
            std::thread::sleep(Duration::from_millis(millis));
        }

        let mode = *self.state.mode.lock().unwrap();
        if mode != FailureMode::None && self.should_fail_now() {
            match mode {
                FailureMode::Decode => {
                    return Err(ChatscribeError::Decode {
                        message: "mock decode failure".to_string(),
                    });
                }
                FailureMode::Crash => {
                    return Err(ChatscribeError::WorkerCrash {
                        message: "mock worker crash".to_string(),
                    });
                }
                FailureMode::Panic => panic!("mock worker crash"),
                FailureMode::None => unreachable!(),
            }
        }

        let responses = self.state.responses.lock().unwrap();
        Ok(responses
            .get(&file_name)
            .cloned()
            .unwrap_or_else(|| self.state.response.lock().unwrap().clone()))
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }

    fn is_ready(&self) -> bool {
        *self.state.mode.lock().unwrap() == FailureMode::None
    }
}
