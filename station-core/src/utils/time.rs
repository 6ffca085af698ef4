//! Time formatting helpers
//!
//! All engine timestamps are `i64` Unix millis; formatting for display
//! happens here.

/// Format a remaining-time span as `HH:MM:SS`
///
/// Negative spans clamp to `00:00:00`.
pub fn format_remaining(ms: i64) -> String {
    if ms <= 0 {
        return "00:00:00".to_string();
    }
    let total_seconds = ms / 1000;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}
