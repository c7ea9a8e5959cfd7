//! Local clinical record
//!
//! The patient record as fetched from the clinic backend. It lives only in
//! local memory and secure storage and is never sent to the generation
//! service. Every field is optional so partial fetches still deserialize.

use serde::{Deserialize, Serialize};

/// Postal address
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Address {
    pub line1: Option<String>,
    pub line2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
}

impl Address {
    /// Single-line rendering, e.g. `12 Oak St, Suite 4, Springfield, IL 62701`
    pub fn formatted(&self) -> Option<String> {
        let mut parts: Vec<String> = [&self.line1, &self.line2]
            .into_iter()
            .filter_map(|p| non_blank(p.as_deref()))
            .map(str::to_string)
            .collect();

        let state_zip = [self.state.as_deref(), self.zip.as_deref()]
            .into_iter()
            .filter_map(non_blank)
            .collect::<Vec<_>>()
            .join(" ");

        match (non_blank(self.city.as_deref()), state_zip.is_empty()) {
            (Some(city), false) => parts.push(format!("{city}, {state_zip}")),
            (Some(city), true) => parts.push(city.to_string()),
            (None, false) => parts.push(state_zip),
            (None, true) => {}
        }

        if parts.is_empty() {
            None
        } else {
            Some(parts.join(", "))
        }
    }
}

/// Patient identity and contact details
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Patient {
    pub id: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub full_name: Option<String>,
    pub dob: Option<String>,
    pub sex: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<Address>,
    pub mrn: Option<String>,
}

impl Patient {
    /// Explicit full name, else first and last joined
    pub fn display_name(&self) -> Option<String> {
        if let Some(full) = non_blank(self.full_name.as_deref()) {
            return Some(full.to_string());
        }
        join_name(self.first_name.as_deref(), self.last_name.as_deref())
    }
}

/// Insurance coverage
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Coverage {
    pub payer_name: Option<String>,
    pub payer_key: Option<String>,
    pub plan_type: Option<String>,
    pub member_id: Option<String>,
    pub group_id: Option<String>,
    pub subscriber_id: Option<String>,
    pub payer_phone: Option<String>,
    pub payer_fax: Option<String>,
    pub payer_address: Option<Address>,
    pub is_primary: Option<bool>,
}

/// Prior-authorization request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthRequest {
    pub id: Option<String>,
    pub service_name: Option<String>,
    pub service_key: Option<String>,
    pub cpt_codes: Vec<String>,
    pub icd10_codes: Vec<String>,
    pub clinical_question: Option<String>,
    pub requested_units: Option<u32>,
    pub requested_dos: Option<String>,
    pub is_primary: Option<bool>,
}

/// Problem-list entry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Problem {
    pub icd10: Option<String>,
    pub description: Option<String>,
    pub onset_date: Option<String>,
    pub status: Option<String>,
}

/// Conservative-treatment history entry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Therapy {
    pub therapy_type: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub duration_weeks: Option<f64>,
    pub visits: Option<u32>,
    pub outcome: Option<String>,
}

/// Imaging study
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImagingStudy {
    pub modality: Option<String>,
    pub body_part: Option<String>,
    pub study_date: Option<String>,
    pub findings: Option<String>,
}

/// Clinical encounter
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Encounter {
    pub date: Option<String>,
    pub encounter_type: Option<String>,
    pub provider_name: Option<String>,
    pub summary: Option<String>,
}

/// Medication trial
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MedTrial {
    pub medication: Option<String>,
    pub dose: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub duration_weeks: Option<f64>,
    pub outcome: Option<String>,
    pub reason_stopped: Option<String>,
}

/// Denied letter an appeal responds to
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParentLetter {
    pub id: Option<String>,
    pub denial_reason: Option<String>,
    pub denial_code: Option<String>,
    pub denial_date: Option<String>,
    pub appeal_deadline: Option<String>,
}

/// Clinical record for the active patient
///
/// Created per patient selection and replaced when another patient is
/// activated. `coverage` and `request` are the legacy singular fields that
/// older backends still return.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalClinicalRecord {
    pub patient: Option<Patient>,
    pub coverages: Vec<Coverage>,
    pub coverage: Option<Coverage>,
    pub requests: Vec<AuthRequest>,
    pub request: Option<AuthRequest>,
    pub problems: Vec<Problem>,
    pub therapies: Vec<Therapy>,
    pub imaging: Vec<ImagingStudy>,
    pub encounters: Vec<Encounter>,
    pub med_trials: Vec<MedTrial>,
    pub parent_letter: Option<ParentLetter>,
}

impl LocalClinicalRecord {
    /// Coverage used for a letter
    ///
    /// First entry flagged primary, else the first entry, else the legacy
    /// singular `coverage`.
    pub fn primary_coverage(&self) -> Option<&Coverage> {
        self.coverages
            .iter()
            .find(|c| c.is_primary == Some(true))
            .or_else(|| self.coverages.first())
            .or(self.coverage.as_ref())
    }

    /// Request used for a letter, with the same precedence as coverage
    pub fn primary_request(&self) -> Option<&AuthRequest> {
        self.requests
            .iter()
            .find(|r| r.is_primary == Some(true))
            .or_else(|| self.requests.first())
            .or(self.request.as_ref())
    }
}

/// Trimmed value, or `None` when blank
pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

pub(crate) fn join_name(first: Option<&str>, last: Option<&str>) -> Option<String> {
    let joined = [first, last]
        .into_iter()
        .filter_map(non_blank)
        .collect::<Vec<_>>()
        .join(" ");
    if joined.is_empty() {
        None
    } else {
        Some(joined)
    }
}
