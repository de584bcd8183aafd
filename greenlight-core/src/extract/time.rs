//! Date and duration parsing for showtime data.

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone};
use chrono_tz::Tz;
use once_cell::sync::Lazy;
use regex::Regex;

// "7:30 p.m." and friends
static MERIDIEM_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)([ap])\.?\s*m\.?$").expect("valid meridiem regex"));

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %I:%M %p",
    "%m/%d/%Y %H:%M",
];

/// Parse a showtime.
///
/// Times carrying an offset keep it. Naive times are read as wall-clock
/// time in `tz`; a time skipped by a DST change does not parse.
pub fn parse_datetime(raw: &str, tz: Tz) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt);
    }
    if let Ok(dt) = DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%z") {
        return Some(dt);
    }

    let normalized = MERIDIEM_RE
        .replace(raw, |caps: &regex::Captures| {
            format!("{}M", caps[1].to_ascii_uppercase())
        })
        .into_owned();

    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(&normalized, format).ok())
        .and_then(|naive| tz.from_local_datetime(&naive).earliest())
        .map(|dt| dt.fixed_offset())
}

/// Parse an ISO-8601 duration such as `PT1H45M`. Zero and negative spans are rejected.
pub fn parse_duration(raw: &str) -> Option<chrono::Duration> {
    let duration = iso8601::duration(raw.trim()).ok()?;
    let std_duration: std::time::Duration = duration.into();
    chrono::Duration::from_std(std_duration)
        .ok()
        .filter(|d| *d > chrono::Duration::zero())
}

#[cfg(test)]
mod tests {
    use super::*;

    const NEW_YORK: Tz = chrono_tz::America::New_York;

    #[test]
    fn keeps_explicit_offsets() {
        let dt = parse_datetime("2026-01-28T14:00:00-05:00", NEW_YORK).unwrap();
        assert_eq!(dt.to_rfc3339(), "2026-01-28T14:00:00-05:00");

        let compact = parse_datetime("2026-01-28T14:00:00-0500", NEW_YORK).unwrap();
        assert_eq!(compact, dt);
    }

    #[test]
    fn naive_times_use_venue_zone() {
        let winter = parse_datetime("2026-01-28T14:00:00", NEW_YORK).unwrap();
        assert_eq!(winter.to_rfc3339(), "2026-01-28T14:00:00-05:00");

        let summer = parse_datetime("2026-07-04 20:15", NEW_YORK).unwrap();
        assert_eq!(summer.to_rfc3339(), "2026-07-04T20:15:00-04:00");
    }

    #[test]
    fn accepts_us_twelve_hour_times() {
        let expected = parse_datetime("2026-03-01T19:30:00", NEW_YORK).unwrap();
        assert_eq!(parse_datetime("03/01/2026 7:30 PM", NEW_YORK), Some(expected));
        assert_eq!(parse_datetime("03/01/2026 7:30 p.m.", NEW_YORK), Some(expected));
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(parse_datetime("next tuesday", NEW_YORK), None);
        assert_eq!(parse_datetime("", NEW_YORK), None);
        // 02:30 does not exist on the spring-forward night
        assert_eq!(parse_datetime("2026-03-08T02:30:00", NEW_YORK), None);
    }

    #[test]
    fn parses_iso_durations() {
        assert_eq!(parse_duration("PT1H45M"), Some(chrono::Duration::minutes(105)));
        assert_eq!(parse_duration("PT90M"), Some(chrono::Duration::minutes(90)));
        assert_eq!(parse_duration("PT0M"), None);
        assert_eq!(parse_duration("ninety minutes"), None);
    }
}
