//! Clinical code shapes and key slugs

use regex::Regex;
use std::sync::LazyLock;

/// Maximum length of a normalized key
pub const MAX_KEY_LEN: usize = 48;

static CPT_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}[0-9A-Z]$").expect("valid CPT shape"));
static ICD10_SHAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Z]\d{2}(?:\.[0-9A-Z]{1,4})?$").expect("valid ICD-10 shape")
});

/// Whether the whole value is a CPT/HCPCS-style code (`72148`, `0275T`)
pub fn is_cpt_code(value: &str) -> bool {
    CPT_SHAPE.is_match(value)
}

/// Whether the whole value is an ICD-10-CM code (`M54.16`)
pub fn is_icd10_code(value: &str) -> bool {
    ICD10_SHAPE.is_match(value)
}

/// Trimmed, uppercased CPT code, or `None` if it is not code-shaped
pub fn normalize_cpt(raw: &str) -> Option<String> {
    let code = raw.trim().to_ascii_uppercase();
    is_cpt_code(&code).then_some(code)
}

/// Trimmed, uppercased ICD-10 code, or `None` if it is not code-shaped
pub fn normalize_icd10(raw: &str) -> Option<String> {
    let code = raw.trim().to_ascii_uppercase();
    is_icd10_code(&code).then_some(code)
}

/// Lowercase `[a-z0-9_]` slug, at most `MAX_KEY_LEN` chars
///
/// Runs of anything else collapse to one underscore; leading and trailing
/// underscores are stripped.
pub fn slugify(raw: &str) -> String {
    let mut slug = String::with_capacity(raw.len());
    for c in raw.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('_') {
            slug.push('_');
        }
    }

    slug.truncate(MAX_KEY_LEN);
    slug.trim_end_matches('_').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("72148", true ; "numeric cpt")]
    #[test_case("0275T", true ; "category three cpt")]
    #[test_case("7214", false ; "too short")]
    #[test_case("721489", false ; "too long")]
    fn test_cpt_shape(code: &str, expected: bool) {
        assert_eq!(is_cpt_code(code), expected);
    }

    #[test_case("M54.16", true ; "with subcode")]
    #[test_case("M51", true ; "category only")]
    #[test_case("m54.5", false ; "lowercase before normalization")]
    #[test_case("54.16", false ; "missing letter")]
    fn test_icd10_shape(code: &str, expected: bool) {
        assert_eq!(is_icd10_code(code), expected);
    }

    #[test]
    fn test_normalize_codes() {
        assert_eq!(normalize_icd10(" m54.5 ").as_deref(), Some("M54.5"));
        assert_eq!(normalize_cpt("0275t").as_deref(), Some("0275T"));
        assert_eq!(normalize_cpt("call 555"), None);
    }

    #[test_case("Blue Cross / Blue Shield", "blue_cross_blue_shield" ; "punctuation")]
    #[test_case("  PPO  ", "ppo" ; "trimmed")]
    #[test_case("Épidural—Steroid", "pidural_steroid" ; "non ascii dropped")]
    #[test_case("---", "" ; "nothing left")]
    fn test_slugify(raw: &str, expected: &str) {
        assert_eq!(slugify(raw), expected);
    }

    #[test]
    fn test_slug_length_capped() {
        let slug = slugify(&"lumbar ".repeat(20));
        assert!(slug.len() <= MAX_KEY_LEN);
        assert!(!slug.ends_with('_'));
    }
}
