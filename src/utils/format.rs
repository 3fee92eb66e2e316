//! Display formatting helpers

/// Format elapsed seconds as `MM:SS`.
///
/// Minutes are not wrapped into hours, so one hour renders as `60:00`.
pub fn format_time(seconds: u64) -> String {
    let mins = seconds / 60;
    let secs = seconds % 60;
    format!("{mins:02}:{secs:02}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_time_zero() {
        assert_eq!(format_time(0), "00:00");
    }

    #[test]
    fn test_format_time_minutes_and_seconds() {
        assert_eq!(format_time(65), "01:05");
        assert_eq!(format_time(599), "09:59");
    }

    #[test]
    fn test_format_time_does_not_roll_into_hours() {
        assert_eq!(format_time(3600), "60:00");
        assert_eq!(format_time(6001), "100:01");
    }
}
