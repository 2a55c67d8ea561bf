//! Chat-export manifest: locating voice recordings in an export directory.
//!
//! An export directory holds a `result.json` manifest plus media files at
//! manifest-relative paths. Only entries marked as voice messages are
//! transcribed; every other entry passes through to the report untouched.

use crate::error::{ChatscribeError, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Manifest file name inside an export directory.
pub const MANIFEST_FILE: &str = "result.json";

/// One message from the export manifest.
///
/// Only the fields the report carries are modeled; everything else in the
/// manifest is ignored during deserialization.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Message {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub media_type: Option<String>,
    /// Media path relative to the export directory.
    #[serde(default)]
    pub file: Option<String>,
    /// Either a plain string or a list of runs (strings and styled-entity
    /// objects with a "text" field), depending on formatting.
    #[serde(default)]
    pub text: serde_json::Value,
}

impl Message {
    /// Flatten the message text to plain UTF-8.
    pub fn plain_text(&self) -> String {
        flatten_text(&self.text)
    }

    fn is_voice(&self) -> bool {
        self.media_type.as_deref() == Some("voice_message")
    }
}

fn flatten_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Array(runs) => {
            let mut out = String::new();
            for run in runs {
                match run {
                    serde_json::Value::String(s) => out.push_str(s),
                    serde_json::Value::Object(map) => {
                        if let Some(serde_json::Value::String(s)) = map.get("text") {
                            out.push_str(s);
                        }
                    }
                    _ => {}
                }
            }
            out
        }
        _ => String::new(),
    }
}

/// A voice message resolved against its export directory.
#[derive(Debug, Clone, PartialEq)]
pub struct VoiceRecording {
    pub message: Message,
    /// Absolute-ish path to the media file (export dir joined with the
    /// manifest-relative path).
    pub path: PathBuf,
}

/// A manifest entry classified for the batch driver.
#[derive(Debug, Clone, PartialEq)]
pub enum ManifestEntry {
    Voice(VoiceRecording),
    Other(Message),
}

impl ManifestEntry {
    pub fn message(&self) -> &Message {
        match self {
            ManifestEntry::Voice(voice) => &voice.message,
            ManifestEntry::Other(message) => message,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatExport {
    messages: Vec<Message>,
}

fn classify(message: Message, export_dir: &Path) -> ManifestEntry {
    if message.is_voice()
        && let Some(file) = message.file.as_deref()
    {
        let path = export_dir.join(file);
        return ManifestEntry::Voice(VoiceRecording { message, path });
    }
    ManifestEntry::Other(message)
}

/// Load and classify every message of the export under `export_dir`.
///
/// Preserves manifest order. Fails with `Manifest` if `result.json` is
/// missing and `ManifestJson` if it doesn't parse.
pub fn load_manifest(export_dir: &Path) -> Result<Vec<ManifestEntry>> {
    let manifest_path = export_dir.join(MANIFEST_FILE);
    let raw = fs::read_to_string(&manifest_path).map_err(|e| ChatscribeError::Manifest {
        message: format!("cannot read {}: {}", manifest_path.display(), e),
    })?;

    let export: ChatExport = serde_json::from_str(&raw)?;
    Ok(export
        .messages
        .into_iter()
        .map(|message| classify(message, export_dir))
        .collect())
}
