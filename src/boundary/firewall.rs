//! Outbound PHI firewall
//!
//! Last gate before any clinical payload goes over the network. It does not
//! trust the de-identifier: every key and every string in the payload is
//! classified again, and the first hit aborts the send.

use super::classifier::PhiClassifier;
use super::codes::{is_cpt_code, is_icd10_code};
use crate::domain::errors::{BoundaryError, PhiDetectedError, ViolationKind};
use crate::domain::packet::DeidentifiedPacket;
use serde::Serialize;
use serde_json::Value;

/// Root keys exempted by default: staff-chosen facility id and the audit stamp
pub const DEFAULT_SKIP_KEYS: [&str; 2] = ["facility_id", "audit"];

/// Keys that identify a patient or carry an exact date, at any depth
pub const FORBIDDEN_KEYS: [&str; 26] = [
    "first_name",
    "middle_name",
    "last_name",
    "full_name",
    "subscriber_name",
    "dob",
    "date_of_birth",
    "address",
    "street",
    "zip",
    "postal_code",
    "phone",
    "fax",
    "email",
    "ssn",
    "member_id",
    "group_id",
    "subscriber_id",
    "account_id",
    "mrn",
    "patient_id",
    "study_date",
    "onset_date",
    "requested_dos",
    "date_of_service",
    "dos",
];

/// Packet roots that carry clinical content and can never be exempted
pub const PROTECTED_ROOT_KEYS: [&str; 5] = ["case_id", "patient", "coverage", "request", "clinical"];

/// Keys whose values may be bare clinical codes
const CODE_KEYS: [&str; 2] = ["cpt", "diagnoses"];

const PATIENT_REF_KEY: &str = "patient_ref";
const LINKABLE_REF_PREFIXES: [&str; 1] = ["LOCAL-"];
const LINKABLE_REF_MARKERS: [&str; 2] = ["PAT-", "MRN"];

/// Outbound payload firewall
#[derive(Clone)]
pub struct Firewall {
    classifier: PhiClassifier,
}

impl Firewall {
    /// Create a firewall over the shared classifier
    pub fn new(classifier: PhiClassifier) -> Self {
        Self { classifier }
    }

    /// Fail on the first PHI-shaped key or value in `payload`
    ///
    /// `skip_keys` exempts keys at the payload root only; a nested key with
    /// the same name is still checked. A skip key naming a protected root or
    /// a forbidden key has no effect.
    pub fn assert_no_phi(&self, payload: &Value, skip_keys: &[&str]) -> Result<(), PhiDetectedError> {
        let result = match payload {
            Value::Object(map) => map
                .iter()
                .filter(|(key, _)| !(skip_keys.contains(&key.as_str()) && is_exemptible(key)))
                .try_for_each(|(key, value)| self.check_entry(key, value, key)),
            other => self.walk(other, "", None),
        };

        if let Err(err) = &result {
            crate::log_boundary_block!(err.kind, err.path);
        }
        result
    }

    /// Serialize `payload` and check the resulting JSON
    pub fn assert_serializable<T: Serialize>(
        &self,
        payload: &T,
        skip_keys: &[&str],
    ) -> crate::domain::Result<()> {
        let value = serde_json::to_value(payload)?;
        self.assert_no_phi(&value, skip_keys)?;
        Ok(())
    }

    /// Check a packet with the default root exemptions
    pub fn assert_packet(&self, packet: &DeidentifiedPacket) -> crate::domain::Result<()> {
        self.assert_serializable(packet, &DEFAULT_SKIP_KEYS)
    }

    fn check_entry(&self, key: &str, value: &Value, path: &str) -> Result<(), PhiDetectedError> {
        let key_lower = key.to_lowercase();
        if FORBIDDEN_KEYS.contains(&key_lower.as_str()) {
            return Err(PhiDetectedError::new(ViolationKind::BlockedKey, path));
        }

        if key_lower == PATIENT_REF_KEY {
            if let Value::String(reference) = value {
                if is_linkable_ref(reference) {
                    return Err(PhiDetectedError::new(ViolationKind::BlockedPatientRef, path));
                }
            }
        }

        self.walk(value, path, Some(&key_lower))
    }

    fn walk(&self, value: &Value, path: &str, key: Option<&str>) -> Result<(), PhiDetectedError> {
        match value {
            Value::String(text) => {
                if key.is_some_and(|k| CODE_KEYS.contains(&k)) && is_clinical_code(text) {
                    return Ok(());
                }
                if self.classifier.detect(text).is_some() {
                    let path = if path.is_empty() { "$" } else { path };
                    return Err(PhiDetectedError::new(ViolationKind::BlockedText, path));
                }
                Ok(())
            }
            Value::Object(map) => map.iter().try_for_each(|(child, child_value)| {
                let child_path = if path.is_empty() {
                    child.clone()
                } else {
                    format!("{path}.{child}")
                };
                self.check_entry(child, child_value, &child_path)
            }),
            Value::Array(items) => items.iter().enumerate().try_for_each(|(idx, item)| {
                self.walk(item, &format!("{path}[{idx}]"), key)
            }),
            _ => Ok(()),
        }
    }
}

/// Reject skip keys that would switch the firewall off for clinical content
///
/// Skip keys are for administrative root metadata: no dots, no packet
/// clinical roots, no forbidden keys.
pub fn validate_skip_keys<S: AsRef<str>>(skip_keys: &[S]) -> Result<(), BoundaryError> {
    for key in skip_keys.iter().map(AsRef::as_ref) {
        if key.contains('.') {
            return Err(BoundaryError::Configuration(format!(
                "skip key '{key}' is nested; skip keys apply to root keys only"
            )));
        }
        if !is_exemptible(key) {
            return Err(BoundaryError::Configuration(format!(
                "skip key '{key}' names clinical or identifying content and cannot be exempted"
            )));
        }
    }
    Ok(())
}

fn is_exemptible(key: &str) -> bool {
    let key_lower = key.to_lowercase();
    !PROTECTED_ROOT_KEYS.contains(&key_lower.as_str())
        && !FORBIDDEN_KEYS.contains(&key_lower.as_str())
}

/// Whether a `patient_ref` value looks like a stable local identifier
fn is_linkable_ref(reference: &str) -> bool {
    LINKABLE_REF_PREFIXES.iter().any(|p| reference.starts_with(p))
        || LINKABLE_REF_MARKERS.iter().any(|m| reference.contains(m))
}

fn is_clinical_code(text: &str) -> bool {
    is_cpt_code(text) || is_icd10_code(text)
}
