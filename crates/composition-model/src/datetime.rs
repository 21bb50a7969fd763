//! Formatting of the date line drawn under the name.
//!
//! The raw inputs are the values of an HTML-style date picker
//! (`YYYY-MM-DD`) and time picker (`HH:MM`, 24-hour). They are rendered as
//! `On 5th Mar 2024` and `2:30 PM` and joined with three spaces.

use chrono::{Datelike, NaiveDate, NaiveTime, Timelike};

/// Separator between the formatted date and time.
pub const DATE_TIME_SEPARATOR: &str = "   ";

/// English ordinal suffix for a day of the month.
///
/// 4 through 20 always take "th" (which covers 11, 12 and 13); otherwise
/// the last digit decides.
pub fn ordinal_suffix(day: u32) -> &'static str {
    if day > 3 && day < 21 {
        return "th";
    }
    match day % 10 {
        1 => "st",
        2 => "nd",
        3 => "rd",
        _ => "th",
    }
}

/// Parse a `YYYY-MM-DD` date input.
pub fn parse_date_input(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}

/// Parse an `HH:MM` (24-hour) time input. Seconds are tolerated.
pub fn parse_time_input(raw: &str) -> Option<NaiveTime> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .ok()
}

/// `2024-03-05` → `On 5th Mar 2024`. Empty or invalid input yields `None`.
pub fn format_date(raw: &str) -> Option<String> {
    let date = parse_date_input(raw)?;
    let day = date.day();
    Some(format!(
        "On {day}{} {} {}",
        ordinal_suffix(day),
        date.format("%b"),
        date.year()
    ))
}

/// `14:30` → `2:30 PM`, `00:05` → `12:05 AM`. Empty or invalid input yields `None`.
pub fn format_time(raw: &str) -> Option<String> {
    let time = parse_time_input(raw)?;
    let (is_pm, hour) = time.hour12();
    Some(format!(
        "{hour}:{:02} {}",
        time.minute(),
        if is_pm { "PM" } else { "AM" }
    ))
}

/// Join the formatted parts, skipping missing ones.
///
/// Returns `None` when both are missing, in which case no date layer is drawn.
pub fn join_date_time(date: Option<&str>, time: Option<&str>) -> Option<String> {
    let parts: Vec<&str> = [date, time]
        .into_iter()
        .flatten()
        .filter(|part| !part.is_empty())
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(DATE_TIME_SEPARATOR))
    }
}

/// Full date line for raw picker values.
pub fn date_time_line(raw_date: &str, raw_time: &str) -> Option<String> {
    let date = format_date(raw_date);
    let time = format_time(raw_time);
    join_date_time(date.as_deref(), time.as_deref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_ordinal_suffix_table() {
        let expected = [
            (1, "st"),
            (2, "nd"),
            (3, "rd"),
            (4, "th"),
            (11, "th"),
            (12, "th"),
            (13, "th"),
            (20, "th"),
            (21, "st"),
            (22, "nd"),
            (23, "rd"),
            (24, "th"),
            (30, "th"),
            (31, "st"),
        ];
        for (day, suffix) in expected {
            assert_eq!(ordinal_suffix(day), suffix, "day {day}");
        }
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date("2024-03-05").as_deref(), Some("On 5th Mar 2024"));
        assert_eq!(format_date("2023-12-22").as_deref(), Some("On 22nd Dec 2023"));
        assert_eq!(format_date("2024-01-11").as_deref(), Some("On 11th Jan 2024"));
        assert_eq!(format_date(""), None);
        assert_eq!(format_date("2024-02-30"), None);
        assert_eq!(format_date("05/03/2024"), None);
    }

    #[test]
    fn test_format_time() {
        assert_eq!(format_time("14:30").as_deref(), Some("2:30 PM"));
        assert_eq!(format_time("00:05").as_deref(), Some("12:05 AM"));
        assert_eq!(format_time("12:00").as_deref(), Some("12:00 PM"));
        assert_eq!(format_time("09:07:59").as_deref(), Some("9:07 AM"));
        assert_eq!(format_time(""), None);
        assert_eq!(format_time("25:00"), None);
    }

    #[test]
    fn test_join_uses_three_spaces() {
        assert_eq!(
            join_date_time(Some("On 5th Mar 2024"), Some("2:30 PM")).as_deref(),
            Some("On 5th Mar 2024   2:30 PM")
        );
        assert_eq!(
            join_date_time(Some("On 5th Mar 2024"), None).as_deref(),
            Some("On 5th Mar 2024")
        );
        assert_eq!(join_date_time(None, Some("2:30 PM")).as_deref(), Some("2:30 PM"));
        assert_eq!(join_date_time(None, None), None);
        assert_eq!(join_date_time(Some(""), Some("")), None);
    }

    #[test]
    fn test_date_time_line_from_raw_inputs() {
        assert_eq!(
            date_time_line("2024-03-05", "14:30").as_deref(),
            Some("On 5th Mar 2024   2:30 PM")
        );
        assert_eq!(
            date_time_line("2024-03-05", "").as_deref(),
            Some("On 5th Mar 2024")
        );
        assert_eq!(date_time_line("", ""), None);
    }

    proptest! {
        #[test]
        fn prop_teens_always_th(day in 4u32..=20) {
            prop_assert_eq!(ordinal_suffix(day), "th");
        }

        #[test]
        fn prop_suffix_follows_last_digit_outside_teens(day in 21u32..=31) {
            let expected = match day % 10 { 1 => "st", 2 => "nd", 3 => "rd", _ => "th" };
            prop_assert_eq!(ordinal_suffix(day), expected);
        }
    }
}
