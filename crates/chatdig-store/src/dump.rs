//! Dump-directory backend.
//!
//! Layout under the data root:
//!
//! ```text
//! IndexedDB/dump/<db>/Member.jsonl
//! IndexedDB/dump/<db>/Chat.jsonl.sz
//! IndexedDB/dump/<db>/ChatMessage.jsonl
//! ```
//!
//! `.jsonl` files hold one JSON value per line. `.jsonl.sz` files hold a single
//! compressed block whose payload is the same line format.

use crate::error::StoreError;
use crate::source::{RecordIter, RecordSource, StoreName};
use chatdig_codec::Decompressor;
use serde_json::Value;
use std::fs::File;
use std::io::{BufRead, BufReader, Cursor};
use std::path::{Path, PathBuf};

/// Longest slice of a malformed line quoted in a parse error.
const PARSE_PREVIEW_BYTES: usize = 80;

/// File-based record source. Each database is a directory of per-store files.
pub struct DumpStore {
    dump_dir: PathBuf,
    decompressor: Box<dyn Decompressor>,
}

impl DumpStore {
    /// Open the dump directory under `root`, decoding compressed store files
    /// with `decompressor`.
    pub fn open(root: &Path, decompressor: Box<dyn Decompressor>) -> Result<Self, StoreError> {
        let dump_dir = root.join("IndexedDB").join("dump");
        if !dump_dir.is_dir() {
            return Err(StoreError::NotFound {
                path: dump_dir.display().to_string(),
            });
        }
        tracing::debug!(
            "Opened dump store at {} (decoder: {})",
            dump_dir.display(),
            decompressor.name()
        );
        Ok(Self {
            dump_dir,
            decompressor,
        })
    }

    fn db_dir(&self, db: &str) -> Result<PathBuf, StoreError> {
        let dir = self.dump_dir.join(db);
        if db.is_empty() || db.contains(['/', '\\']) || !dir.is_dir() {
            return Err(StoreError::UnknownDatabase {
                name: db.to_string(),
            });
        }
        Ok(dir)
    }
}

impl RecordSource for DumpStore {
    fn databases(&self) -> Result<Vec<String>, StoreError> {
        let mut names = Vec::new();
        for entry in std::fs::read_dir(&self.dump_dir)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();
        Ok(names)
    }

    fn records(&self, db: &str, store: StoreName) -> Result<RecordIter<'_>, StoreError> {
        let dir = self.db_dir(db)?;

        let plain = dir.join(format!("{store}.jsonl"));
        if plain.is_file() {
            let reader = BufReader::new(File::open(&plain)?);
            return Ok(Box::new(LineRecords::new(reader, plain)));
        }

        let packed = dir.join(format!("{store}.jsonl.sz"));
        if packed.is_file() {
            let raw = std::fs::read(&packed)?;
            let decoded =
                self.decompressor
                    .decompress(&raw)
                    .map_err(|source| StoreError::Decode {
                        path: packed.display().to_string(),
                        source,
                    })?;
            return Ok(Box::new(LineRecords::new(Cursor::new(decoded), packed)));
        }

        tracing::debug!("No {store} store for {db}");
        Ok(Box::new(std::iter::empty()))
    }
}

/// Lazily parses one JSON value per non-blank line.
struct LineRecords<R> {
    reader: R,
    path: PathBuf,
    line: usize,
    buf: String,
}

impl<R: BufRead> LineRecords<R> {
    fn new(reader: R, path: PathBuf) -> Self {
        Self {
            reader,
            path,
            line: 0,
            buf: String::new(),
        }
    }
}

impl<R: BufRead> Iterator for LineRecords<R> {
    type Item = Result<Value, StoreError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.buf.clear();
            match self.reader.read_line(&mut self.buf) {
                Ok(0) => return None,
                Ok(_) => self.line += 1,
                Err(e) => return Some(Err(e.into())),
            }
            let text = self.buf.trim();
            if text.is_empty() {
                continue;
            }
            return Some(serde_json::from_str(text).map_err(|e| StoreError::Parse {
                path: self.path.display().to_string(),
                line: self.line,
                message: format!(
                    "{e} (near `{}`)",
                    chatdig_types::preview(text, PARSE_PREVIEW_BYTES)
                ),
            }));
        }
    }
}
