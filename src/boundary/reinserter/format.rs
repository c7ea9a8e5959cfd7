//! Date, phone and age formatting for filled letters
//!
//! Unrecognized input is returned unchanged; nothing here fails.

use crate::boundary::dates::parse_date;
use chrono::{Datelike, NaiveDate};

/// `April 12, 1968`
pub fn format_date_long(raw: &str) -> String {
    match parse_date(raw) {
        Some(date) => date.format("%B %-d, %Y").to_string(),
        None => raw.to_string(),
    }
}

/// `04/12/1968`
pub fn format_date_short(raw: &str) -> String {
    match parse_date(raw) {
        Some(date) => date.format("%m/%d/%Y").to_string(),
        None => raw.to_string(),
    }
}

/// `(555) 123-4567` for 10 digits, or 11 digits with a leading `1`
pub fn format_phone(raw: &str) -> String {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    let local = match digits.len() {
        10 => digits.as_str(),
        11 if digits.starts_with('1') => &digits[1..],
        _ => return raw.to_string(),
    };
    format!("({}) {}-{}", &local[..3], &local[3..6], &local[6..])
}

/// Age in whole years on `today`; `None` when the DOB cannot be parsed
pub fn compute_age(dob: &str, today: NaiveDate) -> Option<u32> {
    let birth = parse_date(dob)?;
    let mut age = today.year() - birth.year();
    if (today.month(), today.day()) < (birth.month(), birth.day()) {
        age -= 1;
    }
    u32::try_from(age).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("1968-04-12", "April 12, 1968" ; "iso")]
    #[test_case("04/12/1968", "April 12, 1968" ; "us")]
    #[test_case("1980-01-01", "January 1, 1980" ; "unpadded day")]
    #[test_case("next Tuesday", "next Tuesday" ; "passthrough")]
    fn test_format_date_long(raw: &str, expected: &str) {
        assert_eq!(format_date_long(raw), expected);
    }

    #[test_case("1968-04-12", "04/12/1968" ; "iso")]
    #[test_case("1968-04-12T10:00:00Z", "04/12/1968" ; "timestamp")]
    #[test_case("unknown", "unknown" ; "passthrough")]
    fn test_format_date_short(raw: &str, expected: &str) {
        assert_eq!(format_date_short(raw), expected);
    }

    #[test_case("5551234567", "(555) 123-4567" ; "ten digits")]
    #[test_case("1-555-123-4567", "(555) 123-4567" ; "leading one")]
    #[test_case("+1 (555) 123.4567", "(555) 123-4567" ; "punctuated")]
    #[test_case("2-555-123-4567", "2-555-123-4567" ; "eleven without one")]
    #[test_case("ext 12", "ext 12" ; "passthrough")]
    fn test_format_phone(raw: &str, expected: &str) {
        assert_eq!(format_phone(raw), expected);
    }

    #[test]
    fn test_compute_age() {
        let today = NaiveDate::from_ymd_opt(2024, 4, 11).unwrap();
        assert_eq!(compute_age("1968-04-12", today), Some(55));
        let birthday = NaiveDate::from_ymd_opt(2024, 4, 12).unwrap();
        assert_eq!(compute_age("1968-04-12", birthday), Some(56));
        assert_eq!(compute_age("2030-01-01", today), None);
        assert_eq!(compute_age("n/a", today), None);
    }
}
