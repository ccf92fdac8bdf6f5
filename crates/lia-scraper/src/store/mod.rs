//! Resumable aggregate store of scraped profile records.
//!
//! Two physical encodings share one logical contract:
//!
//! - [`DocumentStore`]: a single JSON document `{"profiles": [...]}`,
//!   rewritten in full after every append.
//! - [`LineStore`]: one JSON record per line, appended without touching
//!   earlier lines.
//!
//! Unreadable or malformed existing data loads as an empty store.

mod document;
mod lines;

use std::path::Path;
use std::str::FromStr;

use lia_core::{ProfileRecord, StoreDocument};

use crate::error::StoreError;

pub use document::{write_document, DocumentStore};
pub use lines::LineStore;

/// Aggregate store contract used by the orchestrator.
pub trait AggregateStore {
    /// Whether `profile_url` was already recorded.
    fn contains(&self, profile_url: &str) -> bool;

    /// Persists one record before returning.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the record cannot be serialized or written.
    fn append(&mut self, record: ProfileRecord) -> Result<(), StoreError>;

    /// Number of distinct profile URLs known to the store.
    fn known_count(&self) -> usize;

    /// The full store content in document form.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backing file cannot be re-read.
    fn snapshot(&self) -> Result<StoreDocument, StoreError>;
}

/// Physical encoding of an aggregate file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreEncoding {
    /// Single JSON document (`all.json`).
    Document,
    /// Line-delimited JSON records (`all.ndjson`).
    Lines,
}

impl FromStr for StoreEncoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" | "document" => Ok(Self::Document),
            "ndjson" | "jsonl" | "lines" => Ok(Self::Lines),
            other => Err(format!(
                "unknown store format '{other}'; expected 'json' or 'ndjson'"
            )),
        }
    }
}

impl std::fmt::Display for StoreEncoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreEncoding::Document => write!(f, "json"),
            StoreEncoding::Lines => write!(f, "ndjson"),
        }
    }
}

/// Loads the store at `path` in the given encoding.
#[must_use]
pub fn open_store(path: &Path, encoding: StoreEncoding) -> Box<dyn AggregateStore> {
    match encoding {
        StoreEncoding::Document => Box::new(DocumentStore::load(path)),
        StoreEncoding::Lines => Box::new(LineStore::load(path)),
    }
}

/// Creates the parent directory of `path` if it is missing.
pub(crate) fn ensure_parent_dir(path: &Path) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| io_error(parent, e))?;
        }
    }
    Ok(())
}

pub(crate) fn io_error(path: &Path, source: std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.display().to_string(),
        source,
    }
}

/// Resume key for a stored record; blank URLs never count as known.
fn record_key(record: &ProfileRecord) -> Option<&str> {
    let url = record.profile_url.trim();
    (!url.is_empty()).then_some(url)
}

/// Reads the file if it exists; any read failure is logged and treated as
/// "no prior data".
fn read_existing(path: &Path) -> Option<String> {
    if !path.exists() {
        return None;
    }
    match std::fs::read_to_string(path) {
        Ok(content) => Some(content),
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "aggregate store unreadable, starting fresh"
            );
            None
        }
    }
}

#[cfg(test)]
#[path = "store_test.rs"]
mod tests;
