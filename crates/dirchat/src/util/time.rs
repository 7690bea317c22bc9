//! Timestamp display

use chrono::{DateTime, Local, Utc};
use dirchat_core::config::TimestampFormat;

/// Render a stored timestamp in the configured style
pub fn format_timestamp(timestamp_str: &str, format: TimestampFormat) -> String {
    match format {
        TimestampFormat::Relative => format_relative_time(timestamp_str),
        TimestampFormat::Absolute => DateTime::parse_from_rfc3339(timestamp_str)
            .map(|ts| ts.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|_| "unknown".to_string()),
        TimestampFormat::Iso8601 => timestamp_str.to_string(),
    }
}

/// Format timestamp as relative time (e.g., "2m ago", "1h ago")
fn format_relative_time(timestamp_str: &str) -> String {
    let Ok(ts) = DateTime::parse_from_rfc3339(timestamp_str) else {
        return "unknown".to_string();
    };
    let duration = Utc::now().signed_duration_since(ts.with_timezone(&Utc));

    if duration.num_seconds() < 0 {
        "in the future".to_string()
    } else if duration.num_seconds() < 60 {
        format!("{}s ago", duration.num_seconds())
    } else if duration.num_minutes() < 60 {
        format!("{}m ago", duration.num_minutes())
    } else if duration.num_hours() < 24 {
        format!("{}h ago", duration.num_hours())
    } else {
        format!("{}d ago", duration.num_days())
    }
}
