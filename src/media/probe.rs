//! Duration probing via ffprobe.

use crate::defaults;
use crate::error::{ChatscribeError, Result};
use crate::media::executor::{CommandExecutor, SystemCommandExecutor};
use std::path::Path;

/// Queries the total duration of a media file.
///
/// Read-only: the only side effect is one ffprobe invocation.
#[derive(Debug, Clone)]
pub struct DurationProber<E: CommandExecutor> {
    executor: E,
}

impl<E: CommandExecutor> DurationProber<E> {
    /// Create a prober backed by the given executor.
    pub fn new(executor: E) -> Self {
        Self { executor }
    }

    /// Total duration of `path` in seconds.
    ///
    /// Fails with `MediaProbe` if the file is missing, unreadable, or
    /// ffprobe exits non-zero; the error carries the raw diagnostic output.
    pub fn probe(&self, path: &Path) -> Result<f64> {
        let path_str = path.to_string_lossy();
        let output = self
            .executor
            .execute(
                defaults::FFPROBE,
                &[
                    "-v",
                    "error",
                    "-show_entries",
                    "format=duration",
                    "-of",
                    "default=noprint_wrappers=1:nokey=1",
                    &path_str,
                ],
            )
            .map_err(|e| match e {
                ChatscribeError::CommandFailed { output, .. } => ChatscribeError::MediaProbe {
                    path: path_str.to_string(),
                    output,
                },
                other => other,
            })?;

        output
            .trim()
            .parse::<f64>()
            .map_err(|_| ChatscribeError::MediaProbe {
                path: path_str.to_string(),
                output: format!("unparseable duration: {:?}", output.trim()),
            })
    }
}

impl DurationProber<SystemCommandExecutor> {
    /// Create a prober using the system ffprobe.
    pub fn system() -> Self {
        Self::new(SystemCommandExecutor::new())
    }
}
