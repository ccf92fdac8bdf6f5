use std::collections::HashSet;
use std::io::Write;
use std::path::{Path, PathBuf};

use lia_core::{ProfileRecord, StoreDocument};

use super::{ensure_parent_dir, io_error, read_existing, record_key, AggregateStore};
use crate::error::StoreError;

/// Aggregate store kept as line-delimited JSON records.
///
/// Appends add exactly one line; earlier lines are never rewritten.
#[derive(Debug)]
pub struct LineStore {
    path: PathBuf,
    known: HashSet<String>,
}

impl LineStore {
    /// Collects known profile URLs from the file at `path`.
    ///
    /// Lines that do not parse as a record are skipped; an unreadable file
    /// behaves like an absent one.
    #[must_use]
    pub fn load(path: &Path) -> Self {
        let known = read_existing(path)
            .map(|content| {
                parse_records(&content)
                    .iter()
                    .filter_map(record_key)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Self {
            path: path.to_path_buf(),
            known,
        }
    }
}

impl AggregateStore for LineStore {
    fn contains(&self, profile_url: &str) -> bool {
        self.known.contains(profile_url)
    }

    fn append(&mut self, record: ProfileRecord) -> Result<(), StoreError> {
        ensure_parent_dir(&self.path)?;

        let mut line = serde_json::to_string(&record)?;
        line.push('\n');

        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| io_error(&self.path, e))?;
        file.write_all(line.as_bytes())
            .map_err(|e| io_error(&self.path, e))?;

        if let Some(key) = record_key(&record) {
            self.known.insert(key.to_string());
        }
        Ok(())
    }

    fn known_count(&self) -> usize {
        self.known.len()
    }

    fn snapshot(&self) -> Result<StoreDocument, StoreError> {
        let profiles = read_existing(&self.path)
            .map(|content| parse_records(&content))
            .unwrap_or_default();
        Ok(StoreDocument { profiles })
    }
}

fn parse_records(content: &str) -> Vec<ProfileRecord> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .filter_map(|(idx, line)| match serde_json::from_str(line) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::debug!(line = idx + 1, error = %e, "skipping malformed store line");
                None
            }
        })
        .collect()
}
