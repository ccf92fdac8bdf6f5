use std::collections::HashSet;
use std::path::{Path, PathBuf};

use lia_core::{ProfileRecord, StoreDocument};

use super::{ensure_parent_dir, io_error, read_existing, record_key, AggregateStore};
use crate::error::StoreError;

/// Aggregate store kept as one JSON document and rewritten on every append.
#[derive(Debug)]
pub struct DocumentStore {
    path: PathBuf,
    known: HashSet<String>,
    document: StoreDocument,
}

impl DocumentStore {
    /// Loads the document at `path`, or an empty store if the file is
    /// absent, unreadable or not a valid document.
    #[must_use]
    pub fn load(path: &Path) -> Self {
        let document = read_existing(path)
            .and_then(|content| match serde_json::from_str::<StoreDocument>(&content) {
                Ok(document) => Some(document),
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "aggregate document malformed, starting fresh"
                    );
                    None
                }
            })
            .unwrap_or_default();

        let known = document
            .profiles
            .iter()
            .filter_map(record_key)
            .map(str::to_string)
            .collect();

        Self {
            path: path.to_path_buf(),
            known,
            document,
        }
    }

    #[must_use]
    pub fn document(&self) -> &StoreDocument {
        &self.document
    }

    #[must_use]
    pub fn into_document(self) -> StoreDocument {
        self.document
    }
}

impl AggregateStore for DocumentStore {
    fn contains(&self, profile_url: &str) -> bool {
        self.known.contains(profile_url)
    }

    fn append(&mut self, record: ProfileRecord) -> Result<(), StoreError> {
        let key = record_key(&record).map(str::to_string);
        self.document.profiles.push(record);
        if let Err(e) = write_document(&self.path, &self.document) {
            self.document.profiles.pop();
            return Err(e);
        }

        if let Some(key) = key {
            self.known.insert(key);
        }
        Ok(())
    }

    fn known_count(&self) -> usize {
        self.known.len()
    }

    fn snapshot(&self) -> Result<StoreDocument, StoreError> {
        Ok(self.document.clone())
    }
}

/// Writes `document` as pretty-printed JSON, creating the parent directory.
///
/// The content goes to a sibling temp file first and is renamed over `path`,
/// so readers never observe a half-written document.
///
/// # Errors
///
/// Returns [`StoreError`] if serialization or any filesystem step fails.
pub fn write_document(path: &Path, document: &StoreDocument) -> Result<(), StoreError> {
    ensure_parent_dir(path)?;

    let mut json = serde_json::to_string_pretty(document)?;
    json.push('\n');

    let file_name = path
        .file_name()
        .map_or_else(|| "aggregate".into(), |n| n.to_string_lossy().into_owned());
    let tmp = path.with_file_name(format!(".{file_name}.tmp"));

    std::fs::write(&tmp, json).map_err(|e| io_error(&tmp, e))?;
    std::fs::rename(&tmp, path).map_err(|e| io_error(path, e))
}
