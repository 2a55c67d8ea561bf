//! End-to-end batch flow against a synthetic chat export.
//!
//! Everything outside the crate is mocked: ffprobe/ffmpeg through the
//! command executor seam, speech recognition through the transcriber seam.

use chatscribe::app::transcribe_manifest;
use chatscribe::manifest::{self, ManifestEntry};
use chatscribe::media::{MockCommandExecutor, scratch_dir};
use chatscribe::pipeline::{Pipeline, PipelineOptions};
use chatscribe::report::{self, ReportRow};
use chatscribe::stt::MockTranscriber;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

fn write_export(dir: &Path) {
    fs::create_dir(dir.join("voice_messages")).unwrap();
    fs::write(dir.join("voice_messages/audio_2.ogg"), b"fake ogg").unwrap();
    fs::write(dir.join("voice_messages/audio_3.ogg"), b"fake ogg").unwrap();
    fs::write(
        dir.join("result.json"),
        r#"{
            "messages": [
                {"id": 1, "date": "2024-03-01T10:00:00", "from": "Alice", "text": "check this out"},
                {"id": 2, "date": "2024-03-01T10:01:00", "from": "Bob",
                 "media_type": "voice_message", "file": "voice_messages/audio_2.ogg",
                 "text": ""},
                {"id": 3, "date": "2024-03-01T10:02:00", "from": "Bob",
                 "media_type": "voice_message", "file": "voice_messages/audio_3.ogg",
                 "text": ""}
            ]
        }"#,
    )
    .unwrap();
}

fn make_pipeline(
    executor: MockCommandExecutor,
    transcriber: MockTranscriber,
) -> Pipeline<MockCommandExecutor, MockTranscriber> {
    Pipeline::new(executor, Arc::new(transcriber), PipelineOptions::default())
}

#[tokio::test]
async fn batch_export_to_csv_report() {
    let export = TempDir::new().unwrap();
    write_export(export.path());

    // First voice message is 95 s (four chunks), second is 3 s (skipped)
    let executor = MockCommandExecutor::new()
        .with_output("ffprobe", "95.0")
        .with_output("ffprobe", "3.0");
    let transcriber = MockTranscriber::new("mock")
        .with_response_for("audio_2_part001.ogg", "first ")
        .with_response_for("audio_2_part002.ogg", "second ")
        .with_response_for("audio_2_part003.ogg", "third ")
        .with_response_for("audio_2_part004.ogg", "fourth");
    let pipeline = make_pipeline(executor.clone(), transcriber);

    let entries = manifest::load_manifest(export.path()).unwrap();
    assert_eq!(entries.len(), 3);

    let rows = transcribe_manifest(&pipeline, &entries, true, 0).await;

    assert_eq!(rows.len(), 3);

    // Text message passes through untouched
    assert_eq!(rows[0].id, 1);
    assert_eq!(rows[0].text, "check this out");
    assert_eq!(rows[0].transcript, "");

    // Long voice message: chunk texts joined in temporal order
    assert_eq!(rows[1].id, 2);
    assert_eq!(rows[1].transcript, "first second third fourth");

    // Short voice message: fixed skip notice, no transcription attempted
    assert_eq!(rows[2].id, 3);
    assert_eq!(
        rows[2].transcript,
        "Voice message under 5 s. Transcription skipped."
    );

    // One extraction per chunk of the long recording only
    assert_eq!(executor.calls_for("ffmpeg").len(), 4);

    // Scratch directories never outlive their recordings
    assert!(!scratch_dir(&export.path().join("voice_messages/audio_2.ogg")).exists());
    assert!(!scratch_dir(&export.path().join("voice_messages/audio_3.ogg")).exists());

    // And the report lands on disk in manifest order
    let report_path = export.path().join("transcribed.csv");
    report::write_csv(&report_path, &rows).unwrap();
    let contents = fs::read_to_string(&report_path).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines.len(), 4);
    assert_eq!(
        lines[0],
        "id,date,from,media_type,file,text,transcribed_voice_msg"
    );
    assert!(lines[2].contains("first second third fourth"));
}

#[tokio::test]
async fn crashing_recognizer_degrades_rows_without_failing_batch() {
    let export = TempDir::new().unwrap();
    write_export(export.path());

    let executor = MockCommandExecutor::new()
        .with_output("ffprobe", "65.0")
        .with_output("ffprobe", "3.0");
    let transcriber = MockTranscriber::new("mock").with_crash();
    let pipeline = make_pipeline(executor, transcriber);

    let entries = manifest::load_manifest(export.path()).unwrap();
    let rows = transcribe_manifest(&pipeline, &entries, true, 0).await;

    assert_eq!(rows.len(), 3);
    // Every chunk of the 65 s recording degraded to a placeholder
    assert!(rows[1].transcript.contains("transcription failed"));
    // The short recording still short-circuits cleanly
    assert!(rows[2].transcript.contains("skipped"));
}

#[tokio::test]
async fn manifest_without_voice_messages_still_reports_every_row() {
    let export = TempDir::new().unwrap();
    fs::write(
        export.path().join("result.json"),
        r#"{"messages": [
            {"id": 10, "date": "2024-03-02T09:00:00", "from": "Alice", "text": "morning"},
            {"id": 11, "date": "2024-03-02T09:05:00", "from": "Bob",
             "media_type": "sticker", "file": "stickers/s.webp", "text": ""}
        ]}"#,
    )
    .unwrap();

    let executor = MockCommandExecutor::new();
    let pipeline = make_pipeline(executor.clone(), MockTranscriber::new("mock"));

    let entries = manifest::load_manifest(export.path()).unwrap();
    assert!(entries.iter().all(|e| matches!(e, ManifestEntry::Other(_))));

    let rows = transcribe_manifest(&pipeline, &entries, true, 0).await;
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|r: &ReportRow| r.transcript.is_empty()));
    assert!(executor.calls_for("ffprobe").is_empty());
}
