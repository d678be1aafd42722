//! Date parsing for command line timestamps
//!
//! Accepts RFC 3339, `YYYY-MM-DD[ HH:MM[:SS]]` (UTC), epoch milliseconds, and
//! relative dates such as "now", "2 hours ago" or "in 15 minutes".

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};

use crate::feed::{FeedError, FeedResult, Millis};

/// Parse a date string into epoch milliseconds, relative to the current time
pub fn parse_date(date_str: &str) -> FeedResult<Millis> {
    parse_date_at(date_str, Utc::now().timestamp_millis())
}

/// Parse a date string into epoch milliseconds, resolving relative dates against `now`
pub fn parse_date_at(date_str: &str, now: Millis) -> FeedResult<Millis> {
    let trimmed = date_str.trim();
    parse_absolute(trimmed)
        .or_else(|| parse_relative(trimmed, now))
        .ok_or_else(|| FeedError::InvalidDate {
            input: date_str.to_string(),
            message: format!(
                "Invalid date format: '{}'. Expected RFC 3339, YYYY-MM-DD[ HH:MM], epoch milliseconds, or relative (e.g., '2 hours ago', 'in 15 minutes')",
                date_str
            ),
        })
}

fn parse_absolute(date_str: &str) -> Option<Millis> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(date_str) {
        return Some(dt.timestamp_millis());
    }

    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(date_str, format) {
            return Some(naive.and_utc().timestamp_millis());
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(date_str, "%Y-%m-%d") {
        return date
            .and_hms_opt(0, 0, 0)
            .map(|midnight| midnight.and_utc().timestamp_millis());
    }

    // Bare integers are epoch milliseconds
    if !date_str.is_empty() && date_str.bytes().all(|b| b.is_ascii_digit()) {
        return date_str.parse::<Millis>().ok();
    }

    None
}

fn parse_relative(date_str: &str, now: Millis) -> Option<Millis> {
    let lower = date_str.to_lowercase();
    match lower.as_str() {
        "now" | "today" => return Some(now),
        "yesterday" => return now.checked_sub(Duration::days(1).num_milliseconds()),
        "tomorrow" => return now.checked_add(Duration::days(1).num_milliseconds()),
        _ => {}
    }

    let parts: Vec<&str> = lower.split_whitespace().collect();
    match parts.as_slice() {
        // "N unit ago"
        [count, unit, "ago"] => {
            let duration = parse_time_unit(unit, count.parse().ok()?)?;
            now.checked_sub(duration.num_milliseconds())
        }
        // "in N unit"
        ["in", count, unit] => {
            let duration = parse_time_unit(unit, count.parse().ok()?)?;
            now.checked_add(duration.num_milliseconds())
        }
        // "N unit from now"
        [count, unit, "from", "now"] => {
            let duration = parse_time_unit(unit, count.parse().ok()?)?;
            now.checked_add(duration.num_milliseconds())
        }
        _ => None,
    }
}

/// Parse a time unit string and count into a chrono Duration
fn parse_time_unit(unit: &str, count: i64) -> Option<Duration> {
    match unit {
        "second" | "seconds" | "sec" | "secs" | "s" => Duration::try_seconds(count),
        "minute" | "minutes" | "min" | "mins" | "m" => Duration::try_minutes(count),
        "hour" | "hours" | "hr" | "hrs" | "h" => Duration::try_hours(count),
        "day" | "days" | "d" => Duration::try_days(count),
        "week" | "weeks" | "w" => Duration::try_weeks(count),
        _ => None,
    }
}

/// Format epoch milliseconds for display, in UTC
pub fn format_millis(timestamp: Millis) -> String {
    DateTime::<Utc>::from_timestamp_millis(timestamp)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| timestamp.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::{MILLIS_PER_DAY, MILLIS_PER_HOUR, MILLIS_PER_MINUTE};

    const NOW: Millis = 1_430_384_400_000; // 2015-04-30 09:00:00 UTC

    #[test]
    fn test_parse_absolute_dates() {
        assert_eq!(parse_date_at("2015-04-30T09:00:00Z", 0).unwrap(), NOW);
        assert_eq!(
            parse_date_at("2015-04-30T04:00:00-05:00", 0).unwrap(),
            NOW
        );
        assert_eq!(parse_date_at("2015-04-30 09:00", 0).unwrap(), NOW);
        assert_eq!(parse_date_at("2015-04-30 09:00:00", 0).unwrap(), NOW);
        assert_eq!(
            parse_date_at("2015-04-30", 0).unwrap(),
            NOW - 9 * MILLIS_PER_HOUR
        );
        assert_eq!(parse_date_at("1430384400000", 0).unwrap(), NOW);
    }

    #[test]
    fn test_parse_relative_dates() {
        assert_eq!(parse_date_at("now", NOW).unwrap(), NOW);
        assert_eq!(parse_date_at("yesterday", NOW).unwrap(), NOW - MILLIS_PER_DAY);
        assert_eq!(
            parse_date_at("2 hours ago", NOW).unwrap(),
            NOW - 2 * MILLIS_PER_HOUR
        );
        assert_eq!(
            parse_date_at("in 15 minutes", NOW).unwrap(),
            NOW + 15 * MILLIS_PER_MINUTE
        );
        assert_eq!(
            parse_date_at("3 days from now", NOW).unwrap(),
            NOW + 3 * MILLIS_PER_DAY
        );
    }

    #[test]
    fn test_invalid_dates() {
        assert!(parse_date_at("invalid", NOW).is_err());
        assert!(parse_date_at("2015-13-01", NOW).is_err());
        assert!(parse_date_at("5 decades ago", NOW).is_err());
        assert!(parse_date_at("", NOW).is_err());
        match parse_date_at("soonish", NOW) {
            Err(FeedError::InvalidDate { input, .. }) => assert_eq!(input, "soonish"),
            other => panic!("expected invalid date, got {:?}", other),
        }
    }

    #[test]
    fn test_relative_dates_out_of_range() {
        assert!(parse_date_at("in 15250284452 weeks", NOW).is_err());
        assert!(parse_date_at("15250284452 weeks ago", -NOW).is_err());
        assert!(parse_date_at("tomorrow", Millis::MAX).is_err());
        assert!(parse_date_at("yesterday", Millis::MIN).is_err());
    }

    #[test]
    fn test_format_millis() {
        assert_eq!(format_millis(NOW), "2015-04-30 09:00:00");
    }
}
