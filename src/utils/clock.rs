use chrono::{DateTime, Local, TimeZone};

/// Source of the timestamps stamped on check-in and check-out.
pub type Clock = fn() -> String;

/// Renders `at` the way a US-English browser prints a local date and time,
/// e.g. `3/14/2025, 8:02:11 AM`.
pub fn render<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    at.format("%-m/%-d/%Y, %-I:%M:%S %p").to_string()
}

pub fn local_now() -> String {
    render(&Local::now())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn renders_locale_style() {
        let at = Utc.with_ymd_and_hms(2025, 3, 14, 8, 2, 11).unwrap();
        assert_eq!(render(&at), "3/14/2025, 8:02:11 AM");

        let at = Utc.with_ymd_and_hms(2025, 12, 1, 15, 30, 0).unwrap();
        assert_eq!(render(&at), "12/1/2025, 3:30:00 PM");
    }

    #[test]
    fn local_now_is_not_blank() {
        assert!(!local_now().is_empty());
    }
}
