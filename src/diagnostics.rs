//! System diagnostics and dependency checking.
//!
//! Verifies that the media toolchain and the model cache are in place
//! before a batch run burns time on a half-broken environment.

use crate::defaults;
use crate::error::{ChatscribeError, Result};
use crate::stt::model_path_for;
use std::process::Command;

/// Result of a dependency check.
#[derive(Debug, PartialEq)]
pub enum CheckResult {
    /// Tool is installed and working
    Ok,
    /// Tool is not found
    NotFound,
    /// Tool is found but has issues
    Warning(String),
}

/// Check if a command exists and is executable.
fn check_command(command: &str) -> CheckResult {
    match Command::new(command).arg("-version").output() {
        Ok(output) if output.status.success() => CheckResult::Ok,
        Ok(_) => CheckResult::Warning(format!("'{}' found but -version failed", command)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => CheckResult::NotFound,
        Err(e) => CheckResult::Warning(format!("Error checking '{}': {}", command, e)),
    }
}

/// Verify the media toolchain before any batch work starts.
///
/// A missing tool here fails the whole run up front instead of on the
/// first recording.
pub fn ensure_toolchain() -> Result<()> {
    for tool in [defaults::FFPROBE, defaults::FFMPEG] {
        if check_command(tool) == CheckResult::NotFound {
            return Err(ChatscribeError::ToolchainMissing {
                tool: tool.to_string(),
            });
        }
    }
    Ok(())
}

fn print_tool_check(label: &str, result: CheckResult, install_hint: &str) {
    print!("{}: ", label);
    match result {
        CheckResult::Ok => println!("✓ OK"),
        CheckResult::NotFound => {
            println!("✗ NOT FOUND");
            println!("  Install: {}", install_hint);
        }
        CheckResult::Warning(msg) => println!("⚠ WARNING: {}", msg),
    }
}

/// Run all dependency checks and print results.
pub fn check_dependencies(model: &str) {
    println!("Checking system dependencies...\n");

    print_tool_check(
        "ffprobe (duration probing)",
        check_command(defaults::FFPROBE),
        "sudo apt install ffmpeg  (Debian/Ubuntu)",
    );
    print_tool_check(
        "ffmpeg (chunk extraction)",
        check_command(defaults::FFMPEG),
        "sudo apt install ffmpeg  (Debian/Ubuntu)",
    );

    println!();
    let model_path = model_path_for(model);
    print!("model '{}': ", model);
    if model_path.exists() {
        println!("✓ OK ({})", model_path.display());
    } else {
        println!("✗ NOT FOUND");
        println!("  Expected at: {}", model_path.display());
        println!(
            "  Download: https://huggingface.co/ggerganov/whisper.cpp/resolve/main/ggml-{}.bin",
            model
        );
    }

    println!();
    if cfg!(feature = "whisper") {
        println!("✓ Speech recognition compiled in.");
    } else {
        println!("⚠ Built without speech recognition.");
        println!("  Rebuild with: cargo build --release --features whisper");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_result_equality() {
        assert_eq!(CheckResult::Ok, CheckResult::Ok);
        assert_eq!(CheckResult::NotFound, CheckResult::NotFound);
        assert_eq!(
            CheckResult::Warning("test".to_string()),
            CheckResult::Warning("test".to_string())
        );
    }

    #[test]
    fn test_check_command_nonexistent() {
        let result = check_command("nonexistent-command-xyz-12345");
        assert_eq!(result, CheckResult::NotFound);
    }

    #[test]
    fn test_check_dependencies_runs_without_panic() {
        check_dependencies("base");
    }
}
