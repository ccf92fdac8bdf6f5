//! Spreadsheet-friendly summary of a filtered document.
//!
//! One row per profile: a hyperlinked display name guessed from the profile
//! URL, a whitespace-collapsed snippet of the first (most recent) post, its
//! timestamp and a hyperlink to the post.

use std::io;
use std::path::Path;

use lia_core::{ProfileRecord, StoreDocument};
use percent_encoding::percent_decode_str;

use crate::error::ExportError;

pub const TABLE_HEADERS: [&str; 4] = ["Profile", "Latest Post", "Timestamp", "Post Link"];

/// Snippet length used when the caller does not choose one.
pub const DEFAULT_SNIPPET_CHARS: usize = 160;

const NO_POSTS: &str = "No posts";
const PLACEHOLDER: &str = "—";

/// Writes the table for `document` to `path`, creating the parent directory.
///
/// # Errors
///
/// Returns [`ExportError`] if the file cannot be created or written.
pub fn write_table(
    path: &Path,
    document: &StoreDocument,
    max_chars: usize,
) -> Result<(), ExportError> {
    let io_err = |source| ExportError::Io {
        path: path.display().to_string(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }
    let file = std::fs::File::create(path).map_err(io_err)?;
    export_table(document, file, max_chars)
}

/// Writes the header row and one row per profile to `writer`.
///
/// `max_chars` bounds the post snippet; 0 leaves it untruncated.
///
/// # Errors
///
/// Returns [`ExportError::Csv`] if a row cannot be written.
pub fn export_table<W: io::Write>(
    document: &StoreDocument,
    writer: W,
    max_chars: usize,
) -> Result<(), ExportError> {
    let mut out = csv::WriterBuilder::new()
        .terminator(csv::Terminator::CRLF)
        .from_writer(writer);

    out.write_record(TABLE_HEADERS)?;
    for profile in &document.profiles {
        out.write_record(table_row(profile, max_chars))?;
    }
    out.flush().map_err(csv::Error::from)?;
    Ok(())
}

fn table_row(profile: &ProfileRecord, max_chars: usize) -> [String; 4] {
    let url = profile.profile_url.trim();
    let profile_cell = hyperlink(url, &guess_profile_name(url));

    let Some(post) = profile.posts.first() else {
        return [
            profile_cell,
            NO_POSTS.to_string(),
            PLACEHOLDER.to_string(),
            PLACEHOLDER.to_string(),
        ];
    };

    [
        profile_cell,
        snippet(&post.content, max_chars),
        post.timestamp.trim().to_string(),
        hyperlink(post.link.trim(), "Link"),
    ]
}

/// Display name from the slug after `/in/` (or the last path segment):
/// percent-decoded, separators turned into spaces, words capitalized.
/// Falls back to the URL itself when no slug is found.
#[must_use]
pub fn guess_profile_name(url: &str) -> String {
    let segments: Vec<&str> = url_path(url).split('/').filter(|s| !s.is_empty()).collect();
    let slug = match segments.iter().position(|s| *s == "in") {
        Some(i) => segments.get(i + 1).copied().unwrap_or_default(),
        None => segments.last().copied().unwrap_or_default(),
    };

    let decoded = percent_decode_str(slug).decode_utf8_lossy();
    let name = decoded
        .replace(['-', '_'], " ")
        .split_whitespace()
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ");

    if name.is_empty() {
        url.to_string()
    } else {
        name
    }
}

/// Spreadsheet `HYPERLINK` formula, or an empty cell when there is no URL.
#[must_use]
pub fn hyperlink(url: &str, label: &str) -> String {
    if url.is_empty() {
        return String::new();
    }
    format!(
        "=HYPERLINK(\"{}\", \"{}\")",
        url.replace('"', ""),
        label.replace('"', "'")
    )
}

/// Collapses whitespace runs and truncates to `max_chars` characters,
/// ending with an ellipsis when cut.
#[must_use]
pub fn snippet(content: &str, max_chars: usize) -> String {
    let text = content.split_whitespace().collect::<Vec<_>>().join(" ");
    if max_chars == 0 || text.chars().count() <= max_chars {
        return text;
    }
    let head: String = text.chars().take(max_chars - 1).collect();
    format!("{}…", head.trim_end())
}

/// Path component of a URL, without query or fragment. Scheme-less input
/// is treated as all path.
fn url_path(url: &str) -> &str {
    let url = url.split_once('#').map_or(url, |(head, _)| head);
    let url = url.split_once('?').map_or(url, |(head, _)| head);
    match url.split_once("://") {
        Some((_, rest)) => rest.find('/').map_or("", |i| &rest[i..]),
        None => url,
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}
