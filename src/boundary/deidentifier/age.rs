//! Age banding from date of birth

use crate::boundary::dates::parse_date;
use chrono::Datelike;

/// Fixed bands as `(lower, upper, label)`; the last band is open-ended
const AGE_BANDS: [(i32, i32, &str); 8] = [
    (0, 17, "0-17"),
    (18, 24, "18-24"),
    (25, 34, "25-34"),
    (35, 44, "35-44"),
    (45, 54, "45-54"),
    (55, 64, "55-64"),
    (65, 74, "65-74"),
    (75, i32::MAX, "75+"),
];

/// Birth year from a DOB string, or a bare four-digit year
pub fn birth_year(dob: &str) -> Option<i32> {
    if let Some(date) = parse_date(dob) {
        return Some(date.year());
    }

    let trimmed = dob.trim();
    if trimmed.len() == 4 && trimmed.chars().all(|c| c.is_ascii_digit()) {
        return trimmed.parse().ok();
    }
    None
}

/// Band for the age reached in `reference_year`
///
/// Only the birth year is used so day and month never influence the band.
/// `None` when the DOB is absent, unparseable, or in the future.
pub fn age_band(dob: Option<&str>, reference_year: i32) -> Option<&'static str> {
    let age = reference_year - birth_year(dob?)?;
    if age < 0 {
        return None;
    }

    AGE_BANDS
        .iter()
        .find(|(lower, upper, _)| (*lower..=*upper).contains(&age))
        .map(|(_, _, label)| *label)
}
