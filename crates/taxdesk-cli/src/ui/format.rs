//! String formatting utilities for UI rendering.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

/// Truncate a string to max length, adding ellipsis if needed.
pub fn truncate(s: &str, max_len: usize) -> String {
    let char_count = s.chars().count();
    if char_count <= max_len {
        return s.to_string();
    }
    if max_len <= 3 {
        return s.chars().take(max_len).collect();
    }
    let truncated: String = s.chars().take(max_len - 3).collect();
    format!("{}...", truncated)
}

/// Format a timestamp for display, in `timezone` when one is configured.
pub fn format_datetime(dt: &DateTime<Utc>, timezone: Option<Tz>, pretty: bool) -> String {
    if !pretty {
        return dt.to_rfc3339();
    }
    match timezone {
        Some(tz) => dt.with_timezone(&tz).format("%Y-%m-%d %H:%M %Z").to_string(),
        None => dt.format("%Y-%m-%d %H:%M UTC").to_string(),
    }
}

pub fn on_off(enabled: bool) -> &'static str {
    if enabled {
        "on"
    } else {
        "off"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello world", 8), "hello...");
        assert_eq!(truncate("hello", 2), "he");
    }

    #[test]
    fn test_format_datetime() {
        let dt = Utc.with_ymd_and_hms(2024, 6, 1, 15, 30, 0).unwrap();
        assert_eq!(format_datetime(&dt, None, true), "2024-06-01 15:30 UTC");
        assert_eq!(format_datetime(&dt, None, false), "2024-06-01T15:30:00+00:00");
        assert_eq!(
            format_datetime(&dt, Some(chrono_tz::America::New_York), true),
            "2024-06-01 11:30 EDT"
        );
    }
}
