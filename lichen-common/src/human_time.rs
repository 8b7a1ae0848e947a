//! Human-readable duration formatting
//!
//! Used wherever a wait or elapsed time is shown to an operator, most
//! prominently the rate-limit wait announcement. Format is selected by
//! magnitude so short waits stay precise and day-long waits stay readable.

/// Format a duration in seconds as a human-readable string.
///
/// - under a minute: `45s`
/// - under an hour: `M:SS` (e.g. `5:30`)
/// - under a day: `H:MM:SS` (e.g. `1:01:01`)
/// - a day or more: `Dd-H:MM:SS` (e.g. `2d-3:00:00`)
///
/// Negative durations (a reset timestamp already in the past) format as the
/// absolute value with a leading minus sign.
///
/// # Examples
///
/// ```
/// use lichen_common::human_time::format_duration;
///
/// assert_eq!(format_duration(45), "45s");
/// assert_eq!(format_duration(330), "5:30");
/// assert_eq!(format_duration(3661), "1:01:01");
/// assert_eq!(format_duration(183600), "2d-3:00:00");
/// assert_eq!(format_duration(-5), "-5s");
/// ```
pub fn format_duration(seconds: i64) -> String {
    let sign = if seconds < 0 { "-" } else { "" };
    let abs = seconds.abs();

    let days = abs / 86_400;
    let hours = (abs % 86_400) / 3600;
    let mins = (abs % 3600) / 60;
    let secs = abs % 60;

    let formatted = if abs < 60 {
        format!("{}s", abs)
    } else if abs < 3600 {
        format!("{}:{:02}", mins, secs)
    } else if abs < 86_400 {
        format!("{}:{:02}:{:02}", hours, mins, secs)
    } else {
        format!("{}d-{}:{:02}:{:02}", days, hours, mins, secs)
    };

    format!("{}{}", sign, formatted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seconds_only() {
        assert_eq!(format_duration(0), "0s");
        assert_eq!(format_duration(5), "5s");
        assert_eq!(format_duration(59), "59s");
    }

    #[test]
    fn test_minutes() {
        assert_eq!(format_duration(60), "1:00");
        assert_eq!(format_duration(330), "5:30");
        assert_eq!(format_duration(3599), "59:59");
    }

    #[test]
    fn test_hours() {
        assert_eq!(format_duration(3600), "1:00:00");
        assert_eq!(format_duration(3661), "1:01:01");
        assert_eq!(format_duration(86399), "23:59:59");
    }

    #[test]
    fn test_days() {
        assert_eq!(format_duration(86400), "1d-0:00:00");
        assert_eq!(format_duration(183600), "2d-3:00:00");
    }

    #[test]
    fn test_negative() {
        assert_eq!(format_duration(-5), "-5s");
        assert_eq!(format_duration(-3661), "-1:01:01");
    }
}
