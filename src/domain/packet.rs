//! De-identified packet
//!
//! The only clinical payload allowed to cross the network boundary. Field
//! names are the wire contract with the generation service. A packet must
//! still pass [`crate::boundary::Firewall`] immediately before it is sent.

use super::ids::{CaseId, PatientRef};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Generator version stamped into every packet by default
pub const DEFAULT_GENERATOR_VERSION: &str = concat!("phi-boundary/", env!("CARGO_PKG_VERSION"));

/// De-identified packet sent to the generation service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeidentifiedPacket {
    pub facility_id: String,
    pub case_id: CaseId,
    pub patient: PacketPatient,
    pub coverage: PacketCoverage,
    pub request: PacketRequest,
    pub clinical: PacketClinical,
    pub audit: PacketAudit,
}

/// Pseudonymous patient demographics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PacketPatient {
    pub patient_ref: PatientRef,
    pub age_band: Option<String>,
    pub sex: Option<String>,
}

/// Normalized coverage keys (no payer contact data)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PacketCoverage {
    pub payer_key: Option<String>,
    pub plan_type: Option<String>,
}

/// Requested service
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PacketRequest {
    pub service_key: Option<String>,
    pub cpt: Vec<String>,
    pub diagnoses: Vec<String>,
    pub requested_units: Option<u32>,
}

/// Sanitized clinical picture
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PacketClinical {
    pub summaries: Vec<String>,
    pub conservative_tx: ConservativeTreatment,
    pub imaging: PacketImaging,
    pub encounter_summaries: Vec<String>,
    pub med_trial_summaries: Vec<String>,
}

/// Aggregated conservative-treatment facts
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConservativeTreatment {
    pub pt_weeks: f64,
    pub nsaids_weeks: f64,
    pub injections: Vec<String>,
    pub activity_modification: bool,
    pub other: Vec<OtherTherapy>,
}

/// Therapy outside the closed vocabulary, carried as a typed entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OtherTherapy {
    pub kind: String,
    pub weeks: Option<f64>,
}

/// Imaging modalities and sanitized findings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PacketImaging {
    pub has_imaging: bool,
    pub modalities: Vec<String>,
    pub findings: Vec<String>,
}

/// Audit stamp
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PacketAudit {
    pub phi_removed: bool,
    pub generated_at: DateTime<Utc>,
    pub generator_version: String,
}

impl PacketAudit {
    /// Stamp for a packet produced at `generated_at`
    pub fn new(generated_at: DateTime<Utc>, generator_version: impl Into<String>) -> Self {
        Self {
            phi_removed: true,
            generated_at,
            generator_version: generator_version.into(),
        }
    }
}

/// Template text returned by the generation service
///
/// Produced only from a [`DeidentifiedPacket`], so it carries placeholders
/// where PHI belongs and never PHI itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateText(String);

impl TemplateText {
    /// Wraps raw service output
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// Returns the template as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes self and returns the inner String
    pub fn into_inner(self) -> String {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn test_packet_wire_shape() {
        let case_id = CaseId::generate();
        let packet = DeidentifiedPacket {
            facility_id: "fac-1".to_string(),
            patient: PacketPatient {
                patient_ref: case_id.patient_ref(),
                age_band: Some("35-44".to_string()),
                sex: Some("female".to_string()),
            },
            case_id,
            coverage: PacketCoverage::default(),
            request: PacketRequest::default(),
            clinical: PacketClinical::default(),
            audit: PacketAudit::new(Utc::now(), DEFAULT_GENERATOR_VERSION),
        };

        let value = serde_json::to_value(&packet).unwrap();
        assert!(value["patient"]["patient_ref"]
            .as_str()
            .unwrap()
            .starts_with("CASEONLY-case_"));
        assert_eq!(value["audit"]["phi_removed"], Value::Bool(true));
        assert!(value["clinical"]["conservative_tx"]["injections"].is_array());
        assert!(value["clinical"]["imaging"]["has_imaging"].is_boolean());
    }

    #[test]
    fn test_generator_version_names_crate() {
        assert!(DEFAULT_GENERATOR_VERSION.starts_with("phi-boundary/"));
    }
}
