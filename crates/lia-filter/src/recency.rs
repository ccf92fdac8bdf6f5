//! Post timestamp parsing and the two-week recency window.
//!
//! Timestamps arrive either as machine-readable ISO-8601 values (from a
//! `<time datetime>` attribute) or as LinkedIn's relative labels such as
//! `"2wk"`, `"5d •"` or `"3 weeks ago"`.

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeDelta, Utc};
use regex::Regex;

/// Posts older than this are dropped.
pub const RECENCY_WINDOW_DAYS: i64 = 14;

const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%d %H:%M%:z",
];

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

static RELATIVE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(\d+)\s*(years?|yrs?|y|months?|mos?|mo|weeks?|wks?|wk|w|days?|d|hours?|hrs?|hr|h|minutes?|mins?|min|m)\b",
    )
    .expect("valid regex")
});

/// Parses a post timestamp to a UTC instant.
///
/// ISO-8601 is tried first (a trailing `Z` means UTC, naive values are taken
/// as UTC, a bare date means midnight UTC). Otherwise the first relative
/// `<N> <unit>` expression in the string is subtracted from `now`. Returns
/// `None` when neither form is recognized.
#[must_use]
pub fn parse_timestamp(ts: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let s = ts.trim();
    if s.is_empty() {
        return None;
    }
    parse_iso(s).or_else(|| parse_relative(s, now))
}

/// Whether `ts` lies at most [`RECENCY_WINDOW_DAYS`] days before `now`.
///
/// Unparseable timestamps count as recent, and so do future ones.
#[must_use]
pub fn within_two_weeks(ts: &str, now: DateTime<Utc>) -> bool {
    match parse_timestamp(ts, now) {
        Some(dt) => now - dt <= TimeDelta::days(RECENCY_WINDOW_DAYS),
        None => true,
    }
}

fn parse_iso(s: &str) -> Option<DateTime<Utc>> {
    let s = match s.strip_suffix(['Z', 'z']) {
        Some(rest) => format!("{rest}+00:00"),
        None => s.to_owned(),
    };

    if let Ok(dt) = DateTime::parse_from_rfc3339(&s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(&s, fmt) {
            return Some(dt.with_timezone(&Utc));
        }
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(&s, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(&s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn parse_relative(s: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let caps = RELATIVE_RE.captures(s)?;
    let num: i64 = caps.get(1)?.as_str().parse().ok()?;
    let unit = caps.get(2)?.as_str().to_ascii_lowercase();

    let minutes_per_unit: i64 = if unit.starts_with('y') {
        365 * 24 * 60
    } else if unit.starts_with("mo") {
        30 * 24 * 60
    } else if unit.starts_with('w') {
        7 * 24 * 60
    } else if unit.starts_with('d') {
        24 * 60
    } else if unit.starts_with('h') {
        60
    } else {
        1
    };

    let age = TimeDelta::try_minutes(num.checked_mul(minutes_per_unit)?)?;
    now.checked_sub_signed(age)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap()
    }

    #[test]
    fn iso_within_window_is_recent() {
        assert!(within_two_weeks("2024-01-10T00:00:00Z", now()));
    }

    #[test]
    fn iso_outside_window_is_stale() {
        assert!(!within_two_weeks("2023-12-01T00:00:00Z", now()));
    }

    #[test]
    fn relative_weeks_outside_window_is_stale() {
        assert!(!within_two_weeks("3 weeks ago", now()));
    }

    #[test]
    fn garbage_is_kept() {
        assert!(within_two_weeks("garbage", now()));
        assert!(within_two_weeks("", now()));
    }

    #[test]
    fn window_boundary_is_inclusive() {
        assert!(within_two_weeks("2024-01-01T00:00:00Z", now()));
        assert!(!within_two_weeks("2023-12-31T23:59:59Z", now()));
        assert!(within_two_weeks("14d", now()));
        assert!(!within_two_weeks("15d", now()));
    }

    #[test]
    fn future_timestamps_are_kept() {
        assert!(within_two_weeks("2024-02-01T00:00:00Z", now()));
    }

    #[test]
    fn parses_iso_variants() {
        let expected = Utc.with_ymd_and_hms(2024, 1, 10, 12, 30, 0).unwrap();
        for ts in [
            "2024-01-10T12:30:00Z",
            "2024-01-10T12:30:00.000Z",
            "2024-01-10T14:30:00+02:00",
            "2024-01-10T12:30:00",
            "2024-01-10 12:30:00",
            "2024-01-10T12:30",
        ] {
            assert_eq!(parse_timestamp(ts, now()), Some(expected), "{ts}");
        }
        assert_eq!(
            parse_timestamp("2024-01-10", now()),
            Some(Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn parses_linkedin_relative_labels() {
        let cases = [
            ("2wk", TimeDelta::days(14)),
            ("5d •", TimeDelta::days(5)),
            ("3 days ago", TimeDelta::days(3)),
            ("1yr", TimeDelta::days(365)),
            ("6mo", TimeDelta::days(180)),
            ("2 Months", TimeDelta::days(60)),
            ("12h", TimeDelta::hours(12)),
            ("30m", TimeDelta::minutes(30)),
            ("45 mins ago", TimeDelta::minutes(45)),
        ];
        for (label, age) in cases {
            assert_eq!(parse_timestamp(label, now()), Some(now() - age), "{label}");
        }
    }

    #[test]
    fn first_relative_match_wins() {
        assert_eq!(
            parse_timestamp("2d • edited 3w", now()),
            Some(now() - TimeDelta::days(2))
        );
    }

    #[test]
    fn unit_must_end_at_word_boundary() {
        // "dx" is no unit; nothing else in the string matches.
        assert_eq!(parse_timestamp("5dx", now()), None);
    }

    #[test]
    fn overflowing_relative_number_is_unparseable() {
        assert_eq!(parse_timestamp("99999999999999999999y", now()), None);
        assert!(within_two_weeks("99999999999999999999y", now()));
    }
}
