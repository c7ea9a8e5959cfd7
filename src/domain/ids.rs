//! Ephemeral identifier types for outbound packets
//!
//! Newtype wrappers for the only identifiers allowed to leave the device.
//! Neither can be constructed from a real patient id.

use chrono::{DateTime, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Length of the random suffix appended to every case id
const CASE_SUFFIX_LEN: usize = 6;

/// Prefix that marks a pseudonymous patient reference
pub const PATIENT_REF_PREFIX: &str = "CASEONLY-";

/// Per-generation case identifier
///
/// Format: `case_<unix millis>_<random suffix>`. A new one is minted for
/// every packet and never reused.
///
/// # Examples
///
/// ```
/// use phi_boundary::domain::ids::CaseId;
///
/// let case_id = CaseId::generate();
/// assert!(case_id.as_str().starts_with("case_"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CaseId(String);

impl CaseId {
    /// Generates a fresh case id stamped with the current time
    pub fn generate() -> Self {
        Self::generate_at(Utc::now())
    }

    /// Generates a fresh case id stamped with `now`
    pub fn generate_at(now: DateTime<Utc>) -> Self {
        let suffix: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(CASE_SUFFIX_LEN)
            .map(|b| char::from(b).to_ascii_lowercase())
            .collect();
        Self(format!("case_{}_{}", now.timestamp_millis(), suffix))
    }

    /// Returns the case id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Derives the pseudonymous patient reference for this case
    pub fn patient_ref(&self) -> PatientRef {
        PatientRef(format!("{PATIENT_REF_PREFIX}{}", self.0))
    }
}

impl fmt::Display for CaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for CaseId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Whether `s` has the `case_<unix millis>_<suffix>` shape
fn is_case_id_shape(s: &str) -> bool {
    let mut parts = s.split('_');
    match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some("case"), Some(millis), Some(suffix), None) => {
            !millis.is_empty()
                && millis.chars().all(|c| c.is_ascii_digit())
                && suffix.len() == CASE_SUFFIX_LEN
                && suffix
                    .chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        }
        _ => false,
    }
}

/// Pseudonymous patient reference, `CASEONLY-<case id>`
///
/// Minted through [`CaseId::patient_ref`]. Deserialization accepts only
/// that same shape, so a stored packet cannot smuggle in a local id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub struct PatientRef(String);

impl TryFrom<String> for PatientRef {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.strip_prefix(PATIENT_REF_PREFIX) {
            Some(case_id) if is_case_id_shape(case_id) => Ok(Self(value)),
            _ => Err(format!(
                "patient_ref must be {PATIENT_REF_PREFIX}<case id>, got a {}-char value",
                value.chars().count()
            )),
        }
    }
}

impl PatientRef {
    /// Returns the reference as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PatientRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
