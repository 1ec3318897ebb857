use chrono::{DateTime, NaiveDate, NaiveDateTime};

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Parse a sale/listing/as-of date into epoch milliseconds.
///
/// Accepted shapes:
/// - RFC 3339 (`2024-12-01T10:00:00Z`, `2024-12-01T10:00:00-05:00`)
/// - naive date-time, read as UTC (`2024-12-01T10:00:00`)
/// - calendar date, read as UTC midnight (`2024-12-01`)
pub fn parse_timestamp_millis(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.timestamp_millis());
    }

    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(naive.and_utc().timestamp_millis());
        }
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().timestamp_millis())
}

/// Whole days from `from` to `to`, rounded half up. Negative when `to`
/// precedes `from`. `None` if either side is missing or unparseable.
pub fn days_between(from: Option<&str>, to: Option<&str>) -> Option<i64> {
    let from = parse_timestamp_millis(from?)?;
    let to = parse_timestamp_millis(to?)?;

    let days = (to - from) as f64 / MILLIS_PER_DAY;
    Some((days + 0.5).floor() as i64)
}
