//! Date helper functions

use chrono::NaiveDate;
use std::fmt::Write;

/// Format a date using a Moment.js-compatible format string
///
/// Returns `None` when the format asks for something a calendar date
/// does not carry (such as a timezone).
///
/// # Examples
/// ```ignore
/// format_date(&date, "YYYY-MM-DD") // -> Some("2024-01-15")
/// ```
pub fn format_date(date: &NaiveDate, format: &str) -> Option<String> {
    let chrono_format = moment_to_chrono_format(format);
    let datetime = date.and_hms_opt(0, 0, 0)?;
    let mut out = String::new();
    write!(out, "{}", datetime.format(&chrono_format)).ok()?;
    Some(out)
}

/// Convert Moment.js format to chrono format
fn moment_to_chrono_format(format: &str) -> String {
    // Longest patterns first within each family
    let replacements = [
        ("YYYY", "%Y"),
        ("YY", "%y"),
        ("MMMM", "%B"),
        ("MMM", "%b"),
        ("MM", "%m"),
        ("DDDD", "%j"),
        ("DD", "%d"),
        ("dddd", "%A"),
        ("ddd", "%a"),
    ];

    let mut result = format.to_string();
    for (from, to) in replacements {
        result = result.replace(from, to);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date(&date(), "YYYY-MM-DD").unwrap(), "2024-01-15");
        assert_eq!(format_date(&date(), "YYYY/MM/DD").unwrap(), "2024/01/15");
        assert_eq!(
            format_date(&date(), "dddd, MMMM DD YYYY").unwrap(),
            "Monday, January 15 2024"
        );
    }

    #[test]
    fn test_format_rejects_timezone() {
        assert_eq!(format_date(&date(), "%z"), None);
    }

    #[test]
    fn test_moment_to_chrono() {
        assert_eq!(moment_to_chrono_format("YYYY-MM-DD"), "%Y-%m-%d");
        assert_eq!(moment_to_chrono_format("MMM DD"), "%b %d");
    }
}
