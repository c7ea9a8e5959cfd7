//! Local PHI reinsertion
//!
//! Fills the placeholders in a returned template from the local
//! [`PhiReinsertionContext`]. Runs entirely on the device. Placeholders the
//! context cannot fill are left in place so a review step can find them
//! with [`extract_unfilled_placeholders`].

pub mod format;
pub mod placeholder;
pub mod replacement;

pub use format::{compute_age, format_date_long, format_date_short, format_phone};
pub use placeholder::{
    extract_unfilled_placeholders, has_placeholders, looks_like_document, FieldKey, PlaceholderKey,
};
pub use replacement::ReplacementMap;

use crate::domain::context::PhiReinsertionContext;
use crate::domain::record::non_blank;
use chrono::{Local, NaiveDate};
use placeholder::{captured_key, placeholder_regex};
use regex::Captures;

/// Stateless placeholder filler
///
/// Holds only the date used for the current-date keys.
#[derive(Debug, Clone, Copy)]
pub struct Reinserter {
    today: NaiveDate,
}

impl Reinserter {
    /// Reinserter dated with the local calendar date
    pub fn new() -> Self {
        Self::with_today(Local::now().date_naive())
    }

    /// Reinserter with a fixed current date
    pub fn with_today(today: NaiveDate) -> Self {
        Self { today }
    }

    /// Date rendered for current-date placeholders
    pub fn today(&self) -> NaiveDate {
        self.today
    }

    /// Fill every placeholder the context can supply
    ///
    /// Text without placeholders is returned unchanged.
    pub fn reinsert(&self, text: &str, ctx: &PhiReinsertionContext) -> String {
        if !has_placeholders(text) {
            return text.to_string();
        }

        let map = ReplacementMap::build(ctx, self.today);
        self.reinsert_with(text, &map)
    }

    /// Fill placeholders from a prepared map
    pub fn reinsert_with(&self, text: &str, map: &ReplacementMap) -> String {
        placeholder_regex()
            .replace_all(text, |caps: &Captures| {
                let value = captured_key(caps)
                    .and_then(FieldKey::parse)
                    .and_then(|key| map.get(key));
                match value {
                    Some(value) => value.to_string(),
                    None => caps[0].to_string(),
                }
            })
            .into_owned()
    }
}

impl Default for Reinserter {
    fn default() -> Self {
        Self::new()
    }
}

/// Fill `text` from `ctx` dated today
pub fn reinsert_phi(text: &str, ctx: &PhiReinsertionContext) -> String {
    Reinserter::new().reinsert(text, ctx)
}

/// Result of the pre-flight context check
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContextValidation {
    /// Dotted names of the missing fields
    pub missing: Vec<&'static str>,
}

impl ContextValidation {
    pub fn is_valid(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Minimal pre-flight check: a patient id and some form of patient name
///
/// Reports gaps; never fails.
pub fn validate_context(ctx: &PhiReinsertionContext) -> ContextValidation {
    let mut missing = Vec::new();

    match &ctx.patient {
        None => missing.extend(["patient.id", "patient.full_name"]),
        Some(patient) => {
            if non_blank(patient.id.as_deref()).is_none() {
                missing.push("patient.id");
            }
            let named = non_blank(patient.full_name.as_deref()).is_some()
                || non_blank(patient.first_name.as_deref()).is_some();
            if !named {
                missing.push("patient.full_name");
            }
        }
    }

    ContextValidation { missing }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::record::{Coverage, Patient};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    fn scenario_context() -> PhiReinsertionContext {
        PhiReinsertionContext {
            patient: Some(Patient {
                id: Some("p-1".to_string()),
                full_name: Some("Jane Doe".to_string()),
                dob: Some("1980-01-01".to_string()),
                ..Default::default()
            }),
            coverage: Some(Coverage {
                payer_name: Some("Aetna".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_three_forms_fill_the_same_way() {
        let out = Reinserter::with_today(today()).reinsert(
            "Patient: {{patient_full_name}}, DOB: {patient_dob}, [MISSING: payer_name]",
            &scenario_context(),
        );
        assert_eq!(out, "Patient: Jane Doe, DOB: January 1, 1980, Aetna");
    }

    #[test]
    fn test_unmapped_placeholders_survive() {
        let out = Reinserter::with_today(today()).reinsert(
            "Dear {{ Payer_Name }}, re {member_id} and {{favorite_color}}",
            &scenario_context(),
        );
        assert_eq!(out, "Dear Aetna, re {member_id} and {{favorite_color}}");
        assert_eq!(
            extract_unfilled_placeholders(&out),
            vec![
                PlaceholderKey::Known(FieldKey::MemberId),
                PlaceholderKey::Unknown("favorite_color".to_string()),
            ]
        );
    }

    #[test]
    fn test_reinsertion_is_idempotent() {
        let reinserter = Reinserter::with_today(today());
        let ctx = scenario_context();
        let template = "On {{current_date}}, {patient_full_name} ({{patient_dob_short}}) with {payer_name}.";
        let once = reinserter.reinsert(template, &ctx);
        assert!(!has_placeholders(&once));
        assert_eq!(reinserter.reinsert(&once, &ctx), once);
    }

    #[test]
    fn test_empty_value_substitutes_empty() {
        let mut ctx = scenario_context();
        if let Some(patient) = ctx.patient.as_mut() {
            patient.email = Some(String::new());
        }
        let out = Reinserter::with_today(today()).reinsert("Email: [{{patient_email}}]", &ctx);
        assert_eq!(out, "Email: []");
    }

    #[test]
    fn test_no_placeholders_is_noop() {
        let text = "Dear reviewer, nothing to fill. Sincerely, Clinic";
        assert_eq!(
            Reinserter::with_today(today()).reinsert(text, &scenario_context()),
            text
        );
    }

    #[test]
    fn test_validate_context() {
        assert!(validate_context(&scenario_context()).is_valid());

        let empty = validate_context(&PhiReinsertionContext::default());
        assert_eq!(empty.missing, vec!["patient.id", "patient.full_name"]);

        let first_only = PhiReinsertionContext {
            patient: Some(Patient {
                first_name: Some("Jane".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert_eq!(validate_context(&first_only).missing, vec!["patient.id"]);
    }
}
