use chrono::{DateTime, Duration, Local};

/// Formats a runtime as `H:MM:SS`, prefixed with `N day(s), ` past 24 hours.
/// Sub-second precision is dropped and negative spans clamp to zero.
pub fn format_runtime(runtime: Duration) -> String {
    let seconds = runtime.num_seconds().max(0);
    let days = seconds / 86400;
    let hours = (seconds % 86400) / 3600;
    let mins = (seconds % 3600) / 60;
    let secs = seconds % 60;

    let clock = format!("{}:{:02}:{:02}", hours, mins, secs);
    match days {
        0 => clock,
        1 => format!("1 day, {}", clock),
        _ => format!("{} days, {}", days, clock),
    }
}

pub fn format_clock(at: DateTime<Local>) -> String {
    at.format("%H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_runtime() {
        assert_eq!(format_runtime(Duration::zero()), "0:00:00");
        assert_eq!(format_runtime(Duration::seconds(5)), "0:00:05");
        assert_eq!(format_runtime(Duration::milliseconds(5_900)), "0:00:05");
        assert_eq!(format_runtime(Duration::seconds(61)), "0:01:01");
        assert_eq!(format_runtime(Duration::seconds(3661)), "1:01:01");
        assert_eq!(format_runtime(Duration::hours(8)), "8:00:00");
        assert_eq!(format_runtime(Duration::seconds(86400 + 61)), "1 day, 0:01:01");
        assert_eq!(format_runtime(Duration::days(3)), "3 days, 0:00:00");
        assert_eq!(format_runtime(Duration::seconds(-4)), "0:00:00");
    }

    #[test]
    fn test_format_clock() {
        let at = Local.with_ymd_and_hms(2023, 1, 1, 9, 5, 7).unwrap();
        assert_eq!(format_clock(at), "09:05:07");
    }
}
