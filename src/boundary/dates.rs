//! Lenient date parsing shared by the de-identifier and the reinserter

use chrono::{DateTime, NaiveDate, NaiveDateTime};

const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%m-%d-%Y"];
const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];

/// Parse the date formats clinic backends return; `None` for anything else
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }

    DATE_FORMATS
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(s, f).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|f| NaiveDateTime::parse_from_str(s, f).ok())
                .map(|dt| dt.date())
        })
}

/// Whole weeks (one decimal) between two parseable dates
pub fn weeks_between(start: Option<&str>, end: Option<&str>) -> Option<f64> {
    let start = parse_date(start?)?;
    let end = parse_date(end?)?;
    let days = (end - start).num_days();
    if days < 0 {
        return None;
    }
    Some(((days as f64 / 7.0) * 10.0).round() / 10.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("1968-04-12" ; "iso date")]
    #[test_case("1968/04/12" ; "slashed ymd")]
    #[test_case("04/12/1968" ; "us date")]
    #[test_case("4/12/1968" ; "unpadded us date")]
    #[test_case("1968-04-12T08:30:00Z" ; "rfc3339")]
    #[test_case("1968-04-12T08:30:00" ; "naive datetime")]
    fn test_parse_date_formats(raw: &str) {
        assert_eq!(parse_date(raw), NaiveDate::from_ymd_opt(1968, 4, 12));
    }

    #[test]
    fn test_parse_date_rejects_garbage() {
        assert_eq!(parse_date("spring of 1968"), None);
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("1968-13-45"), None);
    }

    #[test]
    fn test_weeks_between() {
        assert_eq!(weeks_between(Some("2024-01-01"), Some("2024-02-12")), Some(6.0));
        assert_eq!(weeks_between(Some("2024-02-12"), Some("2024-01-01")), None);
        assert_eq!(weeks_between(None, Some("2024-01-01")), None);
    }
}
