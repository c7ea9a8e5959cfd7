//! Therapy vocabulary and aggregation

use crate::boundary::classifier::PhiClassifier;
use crate::boundary::dates::weeks_between;
use crate::domain::packet::{ConservativeTreatment, OtherTherapy};
use crate::domain::record::Therapy;

/// Cap on injection entries
pub const MAX_INJECTIONS: usize = 6;
/// Cap on typed "other" therapies
pub const MAX_OTHER_THERAPIES: usize = 6;

const INJECTION_TERMS: [&str; 5] = ["injection", "epidural", "esi", "nerve block", "facet block"];
const PT_TERMS: [&str; 4] = ["physical therapy", "physiotherapy", "physio", "pt"];
const NSAID_TERMS: [&str; 7] = [
    "nsaid",
    "nsaids",
    "ibuprofen",
    "naproxen",
    "meloxicam",
    "diclofenac",
    "anti-inflammatory",
];
const ACTIVITY_TERMS: [&str; 4] = ["activity modification", "activity", "rest", "modified duty"];

/// Closed therapy vocabulary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TherapyKind {
    PhysicalTherapy,
    Nsaids,
    Injection,
    ActivityModification,
    /// Carried as a slug of the original type
    Other,
}

impl TherapyKind {
    /// Vocabulary key; `None` for [`TherapyKind::Other`]
    pub fn key(&self) -> Option<&'static str> {
        match self {
            Self::PhysicalTherapy => Some("pt"),
            Self::Nsaids => Some("nsaids"),
            Self::Injection => Some("injection"),
            Self::ActivityModification => Some("activity_mod"),
            Self::Other => None,
        }
    }
}

/// Whether `term` occurs in `text` on word boundaries
fn has_term(text: &str, term: &str) -> bool {
    text.match_indices(term).any(|(start, _)| {
        let end = start + term.len();
        let before = text[..start].chars().next_back();
        let after = text[end..].chars().next();
        !before.is_some_and(|c| c.is_ascii_alphanumeric())
            && !after.is_some_and(|c| c.is_ascii_alphanumeric())
    })
}

/// Map a free-form therapy type into the closed vocabulary
///
/// Injections are checked first so "NSAID injection" counts as an injection.
pub fn classify_therapy(raw: &str) -> TherapyKind {
    let text = raw.trim().to_lowercase();
    let any = |terms: &[&str]| terms.iter().any(|t| has_term(&text, t));

    if any(&INJECTION_TERMS) {
        TherapyKind::Injection
    } else if any(&PT_TERMS) {
        TherapyKind::PhysicalTherapy
    } else if any(&NSAID_TERMS) {
        TherapyKind::Nsaids
    } else if any(&ACTIVITY_TERMS) {
        TherapyKind::ActivityModification
    } else {
        TherapyKind::Other
    }
}

/// Explicit duration, else derived from start and end dates
pub fn therapy_weeks(therapy: &Therapy) -> Option<f64> {
    therapy
        .duration_weeks
        .filter(|w| w.is_finite() && *w >= 0.0)
        .or_else(|| weeks_between(therapy.start_date.as_deref(), therapy.end_date.as_deref()))
}

fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Aggregate therapy history into the packet's typed treatment facts
///
/// Injection and "other" entries are carried as keys normalized from
/// sanitized text, never as the raw type string.
pub fn aggregate(therapies: &[Therapy], classifier: &PhiClassifier) -> ConservativeTreatment {
    let mut tx = ConservativeTreatment::default();

    for therapy in therapies {
        let Some(raw_type) = therapy
            .therapy_type
            .as_deref()
            .or(therapy.description.as_deref())
            .filter(|t| !t.trim().is_empty())
        else {
            continue;
        };
        let weeks = therapy_weeks(therapy);

        match classify_therapy(raw_type) {
            TherapyKind::PhysicalTherapy => tx.pt_weeks += weeks.unwrap_or(0.0),
            TherapyKind::Nsaids => tx.nsaids_weeks += weeks.unwrap_or(0.0),
            TherapyKind::ActivityModification => tx.activity_modification = true,
            TherapyKind::Injection => {
                if tx.injections.len() >= MAX_INJECTIONS {
                    continue;
                }
                if let Some(slug) = classifier.normalize_key(raw_type) {
                    tx.injections.push(slug);
                }
            }
            TherapyKind::Other => {
                let Some(slug) = classifier.normalize_key(raw_type) else {
                    continue;
                };
                match tx.other.iter().position(|o| o.kind == slug) {
                    Some(idx) => {
                        if let Some(w) = weeks {
                            let existing = &mut tx.other[idx];
                            existing.weeks = Some(round_tenth(existing.weeks.unwrap_or(0.0) + w));
                        }
                    }
                    None if tx.other.len() < MAX_OTHER_THERAPIES => {
                        tx.other.push(OtherTherapy { kind: slug, weeks });
                    }
                    None => {}
                }
            }
        }
    }

    tx.pt_weeks = round_tenth(tx.pt_weeks);
    tx.nsaids_weeks = round_tenth(tx.nsaids_weeks);
    tx
}
