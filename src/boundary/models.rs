//! PHI pattern categories

use serde::{Deserialize, Serialize};
use std::fmt;

/// Category of a PHI pattern in the shared library
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PhiCategory {
    /// Email addresses
    Email,
    /// US telephone and fax numbers
    Phone,
    /// Social Security Numbers
    Ssn,
    /// Year-month-day dates (`1968-04-12`)
    DateYmd,
    /// Month-day-year dates (`04/12/1968`)
    DateMdy,
    /// Clock times
    Time,
    /// Five-digit ZIP codes (with optional +4)
    Zip,
    /// Standalone numerals of six or more digits
    LongId,
    /// Explicit PHI label such as `DOB:` or `member id`
    Label,
}

impl PhiCategory {
    /// Categories every pattern library must define
    pub const REQUIRED: [PhiCategory; 8] = [
        Self::Email,
        Self::Phone,
        Self::Ssn,
        Self::DateYmd,
        Self::DateMdy,
        Self::Time,
        Self::Zip,
        Self::LongId,
    ];

    /// Human-readable label for the category
    pub fn label(&self) -> &'static str {
        match self {
            Self::Email => "EMAIL",
            Self::Phone => "PHONE",
            Self::Ssn => "SSN",
            Self::DateYmd => "DATE_YMD",
            Self::DateMdy => "DATE_MDY",
            Self::Time => "TIME",
            Self::Zip => "ZIP",
            Self::LongId => "LONG_ID",
            Self::Label => "LABEL",
        }
    }

    /// Parse a category name from the pattern library
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "EMAIL" => Some(Self::Email),
            "PHONE" | "FAX" => Some(Self::Phone),
            "SSN" => Some(Self::Ssn),
            "DATE_YMD" => Some(Self::DateYmd),
            "DATE_MDY" => Some(Self::DateMdy),
            "TIME" => Some(Self::Time),
            "ZIP" => Some(Self::Zip),
            "LONG_ID" | "IDENTIFIER" => Some(Self::LongId),
            "LABEL" => Some(Self::Label),
            _ => None,
        }
    }
}

impl fmt::Display for PhiCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_round_trips_labels() {
        for category in PhiCategory::REQUIRED {
            assert_eq!(PhiCategory::parse(category.label()), Some(category));
        }
    }

    #[test]
    fn test_parse_aliases_and_case() {
        assert_eq!(PhiCategory::parse("fax"), Some(PhiCategory::Phone));
        assert_eq!(PhiCategory::parse("date_ymd"), Some(PhiCategory::DateYmd));
        assert_eq!(PhiCategory::parse("GEOGRAPHIC"), None);
    }
}
