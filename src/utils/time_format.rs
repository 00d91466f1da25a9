//! Human readable rendering of elapsed time

/// Render a number of seconds as `"{h}h {m}m {s}s"`.
///
/// Hours are omitted when zero and seconds are only included when
/// `include_seconds` is set, so `125` renders as `"2m 5s"` or `"2m"`.
pub fn format_time(total_seconds: u64, include_seconds: bool) -> String {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    match (hours > 0, include_seconds) {
        (true, true) => format!("{}h {}m {}s", hours, minutes, seconds),
        (true, false) => format!("{}h {}m", hours, minutes),
        (false, true) => format!("{}m {}s", minutes, seconds),
        (false, false) => format!("{}m", minutes),
    }
}

/// Display text shown by a timer with nothing on it
pub const ZERO_DISPLAY: &str = "0m 0s";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_renders_minutes_and_seconds() {
        assert_eq!(format_time(0, true), ZERO_DISPLAY);
        assert_eq!(format_time(0, false), "0m");
    }

    #[test]
    fn test_minutes_only() {
        assert_eq!(format_time(125, true), "2m 5s");
        assert_eq!(format_time(125, false), "2m");
        assert_eq!(format_time(59, true), "0m 59s");
    }

    #[test]
    fn test_hours() {
        assert_eq!(format_time(3725, true), "1h 2m 5s");
        assert_eq!(format_time(3725, false), "1h 2m");
        assert_eq!(format_time(3600, true), "1h 0m 0s");
        assert_eq!(format_time(90_000, false), "25h 0m");
    }
}
