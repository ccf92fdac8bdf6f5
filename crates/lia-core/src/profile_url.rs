//! Canonical form for LinkedIn profile URLs.
//!
//! The normalized string is the resume key of the aggregate store, so two
//! inputs name the same profile only if they normalize to identical strings.
//! Host and path are kept byte-for-byte: no case folding, no percent decoding.

const RECENT_ACTIVITY_SUFFIX: &str = "/recent-activity";

/// Normalizes an arbitrary profile URL string.
///
/// Inputs without an `http` prefix get `https://` prepended (after stripping
/// leading slashes). Query and fragment are dropped, the scheme is forced to
/// `https`, and trailing slashes are removed. Applying the function twice
/// yields the same result as applying it once.
///
/// Returns an empty string when nothing resembling a host or path remains.
#[must_use]
pub fn normalize_profile_url(raw: &str) -> String {
    let prefixed;
    let url = if raw.starts_with("http") {
        raw
    } else {
        prefixed = format!("https://{}", raw.trim_start_matches('/'));
        prefixed.as_str()
    };

    let url = url.split_once('#').map_or(url, |(head, _)| head);
    let url = url.split_once('?').map_or(url, |(head, _)| head);

    let (host, path) = match url.split_once("://") {
        Some((_, rest)) => match rest.find('/') {
            Some(idx) => rest.split_at(idx),
            None => (rest, ""),
        },
        // Scheme-less after all (e.g. "httpbin.org/in/x"): everything is path.
        None => ("", url),
    };

    let path = strip_params(path.trim_end_matches('/'));
    if host.is_empty() && path.trim_matches('/').is_empty() {
        return String::new();
    }

    format!("https://{host}{path}")
        .trim_end_matches('/')
        .to_string()
}

/// Drops `;params` from the last path segment.
fn strip_params(path: &str) -> &str {
    let last_segment = path.rfind('/').map_or(0, |i| i + 1);
    match path[last_segment..].find(';') {
        Some(i) => &path[..last_segment + i],
        None => path,
    }
}

/// Returns the profile's recent-activity feed URL.
///
/// The suffix is appended unless the URL already ends with it exactly.
#[must_use]
pub fn to_recent_activity(url: &str) -> String {
    if url.ends_with(RECENT_ACTIVITY_SUFFIX) {
        url.to_string()
    } else {
        format!("{url}{RECENT_ACTIVITY_SUFFIX}")
    }
}
