//! Profile URL list loading.
//!
//! Two sources are accepted. A plain list file holds one profile URL per
//! line, ignoring blank lines and lines starting with `#`. A CSV export holds
//! the URLs in a named column, matched case- and whitespace-insensitively.
//! Every entry is normalized and duplicates are dropped, keeping the first
//! occurrence.

use std::collections::HashSet;
use std::path::Path;

use thiserror::Error;

use crate::profile_url::normalize_profile_url;

#[derive(Debug, Error)]
pub enum InputError {
    #[error("failed to read profile list {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("no profile URLs found in {0}")]
    Empty(String),

    #[error("no column matching {column:?} in {path} (tried {tried})")]
    MissingColumn {
        path: String,
        column: String,
        tried: String,
    },

    #[error("failed to parse CSV {path}: {source}")]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },
}

/// Header of the URL column in the contact exports this tool is fed.
pub const DEFAULT_URL_COLUMN: &str = "Person Linkedin Url";

/// Read, normalize and deduplicate the profile URLs listed in `path`.
///
/// # Errors
///
/// Returns [`InputError::Io`] if the file cannot be read and
/// [`InputError::Empty`] if it lists no usable URL.
pub fn load_profile_urls(path: &Path) -> Result<Vec<String>, InputError> {
    let content = std::fs::read_to_string(path).map_err(|e| InputError::Io {
        path: path.display().to_string(),
        source: e,
    })?;

    let urls = parse_profile_urls(content.lines());
    if urls.is_empty() {
        return Err(InputError::Empty(path.display().to_string()));
    }
    Ok(urls)
}

/// Normalize and deduplicate raw entries, preserving first-seen order.
#[must_use]
pub fn parse_profile_urls<'a, I>(entries: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    normalize_unique(
        entries
            .into_iter()
            .filter(|line| !line.trim_start().starts_with('#')),
    )
}

/// Read the profile URLs in column `url_column` of the CSV file at `path`.
///
/// The file is decoded as UTF-8 (with or without BOM), then UTF-16 (BOM,
/// little-endian, big-endian) and finally Latin-1; the first decoding whose
/// header row has a matching column wins. A header matches when it equals
/// `url_column` after trimming, lowercasing and collapsing whitespace, or
/// failing that, when it contains it.
///
/// # Errors
///
/// Returns [`InputError::Io`] if the file cannot be read,
/// [`InputError::MissingColumn`] if no decoding yields a matching header,
/// [`InputError::Csv`] if a row cannot be parsed and [`InputError::Empty`] if
/// the column holds no usable URL.
pub fn load_profile_urls_csv(path: &Path, url_column: &str) -> Result<Vec<String>, InputError> {
    let display = path.display().to_string();
    let bytes = std::fs::read(path).map_err(|e| InputError::Io {
        path: display.clone(),
        source: e,
    })?;

    let mut tried = Vec::new();
    for (encoding, text) in decodings(&bytes) {
        let cells = column_cells(&text, url_column).map_err(|e| InputError::Csv {
            path: display.clone(),
            source: e,
        })?;
        let Some(cells) = cells else {
            tried.push(encoding);
            continue;
        };

        let path_display = &display;
        tracing::debug!(path = %path_display, encoding, rows = cells.len(), "read profile CSV");
        let urls = normalize_unique(cells.iter().map(String::as_str));
        if urls.is_empty() {
            return Err(InputError::Empty(display));
        }
        return Ok(urls);
    }

    Err(InputError::MissingColumn {
        path: display,
        column: url_column.to_string(),
        tried: tried.join(", "),
    })
}

fn normalize_unique<'a, I>(entries: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen = HashSet::new();
    entries
        .into_iter()
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(normalize_profile_url)
        .filter(|url| !url.is_empty())
        .filter(|url| seen.insert(url.clone()))
        .collect()
}

/// Candidate decodings of `bytes`, in the order they are tried.
fn decodings(bytes: &[u8]) -> Vec<(&'static str, String)> {
    let mut out = Vec::new();

    let (utf8_name, utf8_body) = match bytes.strip_prefix(b"\xEF\xBB\xBF") {
        Some(rest) => ("utf-8-sig", rest),
        None => ("utf-8", bytes),
    };
    if let Ok(text) = std::str::from_utf8(utf8_body) {
        out.push((utf8_name, text.to_string()));
    }

    match bytes {
        [0xFF, 0xFE, rest @ ..] => out.extend(decode_utf16(rest, true).map(|t| ("utf-16", t))),
        [0xFE, 0xFF, rest @ ..] => out.extend(decode_utf16(rest, false).map(|t| ("utf-16", t))),
        _ => {
            out.extend(decode_utf16(bytes, true).map(|t| ("utf-16le", t)));
            out.extend(decode_utf16(bytes, false).map(|t| ("utf-16be", t)));
        }
    }

    out.push(("latin-1", bytes.iter().copied().map(char::from).collect()));
    out
}

fn decode_utf16(bytes: &[u8], little_endian: bool) -> Option<String> {
    if bytes.len() % 2 != 0 {
        return None;
    }
    let units = bytes.chunks_exact(2).map(|pair| {
        let pair = [pair[0], pair[1]];
        if little_endian {
            u16::from_le_bytes(pair)
        } else {
            u16::from_be_bytes(pair)
        }
    });
    char::decode_utf16(units).collect::<Result<String, _>>().ok()
}

/// Cells of the column matching `target`, or `None` if no header matches.
fn column_cells(text: &str, target: &str) -> Result<Option<Vec<String>>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(text.as_bytes());

    let Some(index) = find_column(reader.headers()?, target) else {
        return Ok(None);
    };

    let mut cells = Vec::new();
    for record in reader.records() {
        if let Some(cell) = record?.get(index) {
            cells.push(cell.to_string());
        }
    }
    Ok(Some(cells))
}

fn normalize_header(header: &str) -> String {
    header
        .replace('\u{feff}', "")
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Exact normalized match first, then the first header containing `target`.
fn find_column(headers: &csv::StringRecord, target: &str) -> Option<usize> {
    let target = normalize_header(target);
    let headers: Vec<String> = headers.iter().map(normalize_header).collect();
    headers
        .iter()
        .position(|h| *h == target)
        .or_else(|| headers.iter().position(|h| h.contains(&target)))
}
