//! PHI reinsertion context
//!
//! Local-only mirror of the packet: the real identities needed to fill a
//! template. Built fresh for every reinsertion and never transmitted, so it
//! deliberately does not implement `Serialize`.

use super::record::{
    join_name, non_blank, Address, AuthRequest, Coverage, Encounter, ImagingStudy,
    LocalClinicalRecord, MedTrial, ParentLetter, Patient, Problem, Therapy,
};
use serde::Deserialize;

/// Facility sending the letter
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Facility {
    pub id: Option<String>,
    pub name: Option<String>,
    pub npi: Option<String>,
    pub tax_id: Option<String>,
    pub phone: Option<String>,
    pub fax: Option<String>,
    pub address: Option<Address>,
}

/// Ordering provider who signs the letter
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Provider {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub full_name: Option<String>,
    pub credentials: Option<String>,
    pub npi: Option<String>,
    pub specialty: Option<String>,
    pub phone: Option<String>,
}

impl Provider {
    /// Explicit full name, else first and last joined
    pub fn display_name(&self) -> Option<String> {
        if let Some(full) = non_blank(self.full_name.as_deref()) {
            return Some(full.to_string());
        }
        join_name(self.first_name.as_deref(), self.last_name.as_deref())
    }
}

/// Everything the reinserter may draw from
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct PhiReinsertionContext {
    pub patient: Option<Patient>,
    pub facility: Option<Facility>,
    pub coverage: Option<Coverage>,
    pub request: Option<AuthRequest>,
    pub requests: Vec<AuthRequest>,
    pub provider: Option<Provider>,
    pub problems: Vec<Problem>,
    pub therapies: Vec<Therapy>,
    pub imaging: Vec<ImagingStudy>,
    pub encounters: Vec<Encounter>,
    pub med_trials: Vec<MedTrial>,
    pub parent_letter: Option<ParentLetter>,
}

impl PhiReinsertionContext {
    /// Assembles a context from the cached record plus facility metadata
    ///
    /// Coverage and request follow the record's primary-selection policy so
    /// the filled letter describes the same request the packet did.
    pub fn from_record(
        record: &LocalClinicalRecord,
        facility: Option<Facility>,
        provider: Option<Provider>,
    ) -> Self {
        Self {
            patient: record.patient.clone(),
            facility,
            coverage: record.primary_coverage().cloned(),
            request: record.primary_request().cloned(),
            requests: record.requests.clone(),
            provider,
            problems: record.problems.clone(),
            therapies: record.therapies.clone(),
            imaging: record.imaging.clone(),
            encounters: record.encounters.clone(),
            med_trials: record.med_trials.clone(),
            parent_letter: record.parent_letter.clone(),
        }
    }

    /// Request to describe: explicit single request, else first of the list
    pub fn selected_request(&self) -> Option<&AuthRequest> {
        self.request.as_ref().or_else(|| self.requests.first())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selected_request_fallback_order() {
        let first = AuthRequest {
            service_name: Some("Lumbar MRI".to_string()),
            ..Default::default()
        };
        let explicit = AuthRequest {
            service_name: Some("Epidural injection".to_string()),
            ..Default::default()
        };

        let mut ctx = PhiReinsertionContext {
            requests: vec![first],
            ..Default::default()
        };
        assert_eq!(
            ctx.selected_request().and_then(|r| r.service_name.as_deref()),
            Some("Lumbar MRI")
        );

        ctx.request = Some(explicit);
        assert_eq!(
            ctx.selected_request().and_then(|r| r.service_name.as_deref()),
            Some("Epidural injection")
        );

        let empty = PhiReinsertionContext::default();
        assert!(empty.selected_request().is_none());
    }

    #[test]
    fn test_from_record_uses_primary_selection() {
        let record = LocalClinicalRecord {
            requests: vec![
                AuthRequest {
                    id: Some("r1".to_string()),
                    ..Default::default()
                },
                AuthRequest {
                    id: Some("r2".to_string()),
                    is_primary: Some(true),
                    ..Default::default()
                },
            ],
            ..Default::default()
        };

        let ctx = PhiReinsertionContext::from_record(&record, None, None);
        assert_eq!(
            ctx.selected_request().and_then(|r| r.id.as_deref()),
            Some("r2")
        );
        assert_eq!(ctx.requests.len(), 2);
    }

    #[test]
    fn test_provider_display_name() {
        let provider = Provider {
            first_name: Some("Alan".to_string()),
            last_name: Some("Grant".to_string()),
            ..Default::default()
        };
        assert_eq!(provider.display_name().as_deref(), Some("Alan Grant"));
    }
}
