//! JSON and CSV serialization of export records.

use crate::error::ExportError;
use crate::record::{CSV_COLUMNS, ExportRecord};
use chatdig_types::{Chat, Member};
use serde::Serialize;
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

/// The `messages.json` payload.
#[derive(Debug, Serialize)]
pub struct ExportDocument<'a> {
    pub db_name: &'a str,
    pub exported_at: String,
    pub message_count: usize,
    pub messages: &'a [ExportRecord],
    pub members: &'a BTreeMap<i64, Member>,
    pub chats: &'a BTreeMap<String, Chat>,
}

impl<'a> ExportDocument<'a> {
    pub fn new(
        db_name: &'a str,
        messages: &'a [ExportRecord],
        members: &'a BTreeMap<i64, Member>,
        chats: &'a BTreeMap<String, Chat>,
    ) -> Self {
        Self {
            db_name,
            exported_at: chrono::Local::now().to_rfc3339(),
            message_count: messages.len(),
            messages,
            members,
            chats,
        }
    }
}

/// Write the document as pretty JSON (atomic write: .tmp → rename).
pub fn write_json(path: &Path, document: &ExportDocument<'_>) -> Result<(), ExportError> {
    let json = serde_json::to_string_pretty(document)?;
    let tmp_path = path.with_extension("json.tmp");
    let write = |p: &Path, result: std::io::Result<()>| {
        result.map_err(|source| ExportError::Write {
            path: p.display().to_string(),
            source,
        })
    };
    write(&tmp_path, std::fs::write(&tmp_path, json))?;
    write(path, std::fs::rename(&tmp_path, path))
}

/// Write a header row followed by one row per record.
pub fn write_csv<W: Write>(out: W, records: &[ExportRecord]) -> Result<(), ExportError> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(CSV_COLUMNS)?;
    for record in records {
        let cells: Vec<String> = record
            .csv_cells()
            .iter()
            .map(|c| csv_safe(c).into_owned())
            .collect();
        writer.write_record(&cells)?;
    }
    writer.flush()?;
    Ok(())
}

/// Replace CR, LF and CRLF with a literal `\n` so each record stays on one
/// physical line.
pub fn csv_safe(value: &str) -> Cow<'_, str> {
    if !value.contains(['\r', '\n']) {
        return Cow::Borrowed(value);
    }
    Cow::Owned(value.replace("\r\n", "\\n").replace(['\n', '\r'], "\\n"))
}
