//! Utility functions for formatting and parsing

/// Parse command arguments from message text
pub fn parse_args(text: &str) -> Vec<&str> {
    text.split_whitespace().collect()
}

/// Normalize free-text command arguments into a search query
///
/// Collapses runs of whitespace so `"  song   x "` becomes `"song x"`.
pub fn normalize_query(args: &str) -> String {
    parse_args(args).join(" ")
}

/// Truncate text to at most `max` characters
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

/// Format Unix timestamp to human-readable date
pub fn format_timestamp(timestamp: i64) -> String {
    if timestamp <= 0 {
        return "N/A".to_string();
    }

    use chrono::{TimeZone, Utc};
    match Utc.timestamp_opt(timestamp, 0) {
        chrono::LocalResult::Single(dt) => dt.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        _ => "Invalid".to_string(),
    }
}
