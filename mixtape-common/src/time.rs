//! Duration display formatting
//!
//! Songs carry their duration as a formatted `m:ss` string, computed once at
//! upload time. The player parses the string back into seconds when it needs
//! a numeric value (seek clamping); a string it cannot parse counts as an
//! unknown duration.

/// Format a duration in seconds as `m:ss`.
///
/// Fractional seconds are floored; negative inputs clamp to `0:00`.
///
/// # Examples
///
/// ```
/// use mixtape_common::time::format_duration;
///
/// assert_eq!(format_duration(0.0), "0:00");
/// assert_eq!(format_duration(65.0), "1:05");
/// assert_eq!(format_duration(330.9), "5:30");
/// ```
pub fn format_duration(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };
    let minutes = total / 60;
    let secs = total % 60;
    format!("{}:{:02}", minutes, secs)
}

/// Parse a `m:ss` duration string (or a bare seconds value) back to seconds.
///
/// Returns `None` for anything unparsable; callers treat that as duration 0.
///
/// # Examples
///
/// ```
/// use mixtape_common::time::parse_duration;
///
/// assert_eq!(parse_duration("1:05"), Some(65.0));
/// assert_eq!(parse_duration("225"), Some(225.0));
/// assert_eq!(parse_duration("abc"), None);
/// ```
pub fn parse_duration(text: &str) -> Option<f64> {
    let text = text.trim();
    match text.split_once(':') {
        Some((minutes, seconds)) => {
            let minutes: u64 = minutes.parse().ok()?;
            let seconds: u64 = seconds.parse().ok()?;
            if seconds >= 60 {
                return None;
            }
            Some((minutes * 60 + seconds) as f64)
        }
        None => text.parse::<f64>().ok().filter(|s| *s >= 0.0),
    }
}
