//! Batch report: one CSV row per manifest message.
//!
//! The report mirrors the manifest ordering exactly, voice or not, so it
//! can be diffed against the export. Quoting follows RFC 4180: fields
//! containing commas, quotes, or newlines are quoted, embedded quotes are
//! doubled.

use crate::error::Result;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Transcript column name. The last column of every report.
pub const TRANSCRIPT_COLUMN: &str = "transcribed_voice_msg";

/// One finished row of the batch report.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportRow {
    pub id: i64,
    pub date: String,
    pub from: String,
    pub media_type: String,
    pub file: String,
    pub text: String,
    /// Transcript for voice rows, empty for everything else.
    pub transcript: String,
}

fn csv_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') || value.contains('\r') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Write the report to `path`, truncating any previous run's output.
pub fn write_csv(path: &Path, rows: &[ReportRow]) -> Result<()> {
    let mut out = BufWriter::new(File::create(path)?);

    writeln!(
        out,
        "id,date,from,media_type,file,text,{}",
        TRANSCRIPT_COLUMN
    )?;
    for row in rows {
        writeln!(
            out,
            "{},{},{},{},{},{},{}",
            row.id,
            csv_field(&row.date),
            csv_field(&row.from),
            csv_field(&row.media_type),
            csv_field(&row.file),
            csv_field(&row.text),
            csv_field(&row.transcript),
        )?;
    }
    out.flush()?;
    Ok(())
}
