use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};

/// Passive-day value reported for a student with no usable `last_active`.
pub const NEVER_ACTIVE_DAYS: i64 = 30;

const OFFSET_FORMATS: [&str; 3] = [
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%d %H:%M%:z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
];

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parses a timestamp leniently. Seconds are optional, a trailing `Z` is
/// UTC, calendar dates are read as midnight UTC and naive date-times as
/// UTC. Returns `None` for anything unparseable.
pub fn parse_instant(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }

    let zulu = value
        .strip_suffix('Z')
        .or_else(|| value.strip_suffix('z'))
        .map(|rest| format!("{rest}+00:00"));
    let with_offset = zulu.as_deref().unwrap_or(value);
    for format in OFFSET_FORMATS {
        if let Ok(parsed) = DateTime::parse_from_str(with_offset, format) {
            return Some(parsed.with_timezone(&Utc));
        }
    }

    for format in NAIVE_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(value, format) {
            return Some(parsed.and_utc());
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|midnight| midnight.and_utc())
}

/// Calendar day of a date or date-time string, in UTC.
pub fn parse_day(value: &str) -> Option<NaiveDate> {
    parse_instant(value).map(|instant| instant.date_naive())
}

pub fn days_since(timestamp: Option<&str>, now: DateTime<Utc>) -> i64 {
    match timestamp.and_then(parse_instant) {
        Some(instant) => (now - instant).num_days().max(0),
        None => NEVER_ACTIVE_DAYS,
    }
}

/// Inclusive membership in `[anchor - window_days, anchor]`.
pub fn is_within_trailing_window(
    instant: DateTime<Utc>,
    window_days: i64,
    anchor: DateTime<Utc>,
) -> bool {
    instant >= anchor - Duration::days(window_days) && instant <= anchor
}

/// Half-open membership in `[anchor - 2 * window_days, anchor - window_days)`,
/// the window immediately before the trailing one.
pub fn is_within_previous_window(
    instant: DateTime<Utc>,
    window_days: i64,
    anchor: DateTime<Utc>,
) -> bool {
    let end = anchor - Duration::days(window_days);
    instant >= end - Duration::days(window_days) && instant < end
}

/// Trailing-window test for a date string; unparseable dates are never inside.
pub fn date_within_trailing_window(date: &str, window_days: i64, now: DateTime<Utc>) -> bool {
    parse_instant(date).is_some_and(|instant| is_within_trailing_window(instant, window_days, now))
}

pub fn date_within_previous_window(date: &str, window_days: i64, now: DateTime<Utc>) -> bool {
    parse_instant(date).is_some_and(|instant| is_within_previous_window(instant, window_days, now))
}
