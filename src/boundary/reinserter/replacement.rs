//! Replacement map built from the local PHI context

use super::format::{compute_age, format_date_long, format_date_short, format_phone};
use super::placeholder::FieldKey;
use crate::domain::context::PhiReinsertionContext;
use crate::domain::record::non_blank;
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Flat key → value map for one reinsertion
///
/// A key is present only when the context supplied a value for it. A value
/// supplied as an empty string is kept and substitutes as empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplacementMap(BTreeMap<FieldKey, String>);

impl ReplacementMap {
    /// Build the map for `ctx`, rendering current-date keys for `today`
    pub fn build(ctx: &PhiReinsertionContext, today: NaiveDate) -> Self {
        let mut map = Self::default();
        let today_iso = today.format("%Y-%m-%d").to_string();
        map.put(FieldKey::CurrentDate, Some(format_date_long(&today_iso)));
        map.put(FieldKey::CurrentDateShort, Some(format_date_short(&today_iso)));

        map.add_patient(ctx, today);
        map.add_coverage(ctx);
        map.add_facility(ctx);
        map.add_provider(ctx);
        map.add_request(ctx);
        map.add_lists(ctx);
        map.add_appeal(ctx);
        map
    }

    /// Value for `key`, if the context supplied one
    pub fn get(&self, key: FieldKey) -> Option<&str> {
        self.0.get(&key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn put(&mut self, key: FieldKey, value: Option<String>) {
        if let Some(value) = value {
            self.0.insert(key, value);
        }
    }

    fn add_patient(&mut self, ctx: &PhiReinsertionContext, today: NaiveDate) {
        let Some(patient) = &ctx.patient else {
            return;
        };
        let dob = patient.dob.as_deref();

        self.put(FieldKey::PatientFullName, patient.display_name());
        self.put(FieldKey::PatientFirstName, patient.first_name.clone());
        self.put(FieldKey::PatientLastName, patient.last_name.clone());
        self.put(FieldKey::PatientDob, dob.map(format_date_long));
        self.put(FieldKey::PatientDobShort, dob.map(format_date_short));
        self.put(
            FieldKey::PatientAge,
            dob.and_then(|d| compute_age(d, today)).map(|a| a.to_string()),
        );
        self.put(FieldKey::PatientSex, patient.sex.clone());
        self.put(FieldKey::PatientPhone, patient.phone.as_deref().map(format_phone));
        self.put(FieldKey::PatientEmail, patient.email.clone());
        self.put(
            FieldKey::PatientAddress,
            patient.address.as_ref().and_then(|a| a.formatted()),
        );
        self.put(FieldKey::PatientMrn, patient.mrn.clone());
        self.put(FieldKey::PatientId, patient.id.clone());
    }

    fn add_coverage(&mut self, ctx: &PhiReinsertionContext) {
        let Some(coverage) = &ctx.coverage else {
            return;
        };
        self.put(FieldKey::PayerName, coverage.payer_name.clone());
        self.put(FieldKey::PlanType, coverage.plan_type.clone());
        self.put(FieldKey::MemberId, coverage.member_id.clone());
        self.put(FieldKey::GroupId, coverage.group_id.clone());
        self.put(FieldKey::SubscriberId, coverage.subscriber_id.clone());
        self.put(FieldKey::PayerPhone, coverage.payer_phone.as_deref().map(format_phone));
        self.put(FieldKey::PayerFax, coverage.payer_fax.as_deref().map(format_phone));
        self.put(
            FieldKey::PayerAddress,
            coverage.payer_address.as_ref().and_then(|a| a.formatted()),
        );
    }

    fn add_facility(&mut self, ctx: &PhiReinsertionContext) {
        let Some(facility) = &ctx.facility else {
            return;
        };
        self.put(FieldKey::FacilityName, facility.name.clone());
        self.put(FieldKey::FacilityNpi, facility.npi.clone());
        self.put(FieldKey::FacilityTaxId, facility.tax_id.clone());
        self.put(FieldKey::FacilityPhone, facility.phone.as_deref().map(format_phone));
        self.put(FieldKey::FacilityFax, facility.fax.as_deref().map(format_phone));
        self.put(
            FieldKey::FacilityAddress,
            facility.address.as_ref().and_then(|a| a.formatted()),
        );
    }

    fn add_provider(&mut self, ctx: &PhiReinsertionContext) {
        let Some(provider) = &ctx.provider else {
            return;
        };
        let name = provider.display_name();
        let signature = name.as_deref().map(|n| {
            match non_blank(provider.credentials.as_deref()) {
                Some(credentials) => format!("{n}, {credentials}"),
                None => n.to_string(),
            }
        });

        self.put(FieldKey::ProviderSignature, signature);
        self.put(FieldKey::ProviderName, name);
        self.put(FieldKey::ProviderFirstName, provider.first_name.clone());
        self.put(FieldKey::ProviderLastName, provider.last_name.clone());
        self.put(FieldKey::ProviderCredentials, provider.credentials.clone());
        self.put(FieldKey::ProviderNpi, provider.npi.clone());
        self.put(FieldKey::ProviderSpecialty, provider.specialty.clone());
        self.put(FieldKey::ProviderPhone, provider.phone.as_deref().map(format_phone));
    }

    fn add_request(&mut self, ctx: &PhiReinsertionContext) {
        let Some(request) = ctx.selected_request() else {
            return;
        };
        let dos = request.requested_dos.as_deref();

        self.put(
            FieldKey::ServiceName,
            request
                .service_name
                .clone()
                .or_else(|| request.service_key.clone()),
        );
        self.put(FieldKey::CptCodes, join_non_empty(&request.cpt_codes, ", "));
        self.put(FieldKey::Icd10Codes, join_non_empty(&request.icd10_codes, ", "));
        self.put(FieldKey::ClinicalQuestion, request.clinical_question.clone());
        self.put(
            FieldKey::RequestedUnits,
            request.requested_units.map(|u| u.to_string()),
        );
        self.put(FieldKey::DateOfService, dos.map(format_date_long));
        self.put(FieldKey::DateOfServiceShort, dos.map(format_date_short));
    }

    fn add_lists(&mut self, ctx: &PhiReinsertionContext) {
        let diagnoses: Vec<String> = if ctx.problems.is_empty() {
            ctx.selected_request()
                .map(|r| r.icd10_codes.clone())
                .unwrap_or_default()
        } else {
            ctx.problems
                .iter()
                .filter_map(|p| {
                    let code = non_blank(p.icd10.as_deref());
                    let description = non_blank(p.description.as_deref());
                    match (code, description) {
                        (Some(c), Some(d)) => Some(format!("{c} - {d}")),
                        (Some(c), None) => Some(c.to_string()),
                        (None, Some(d)) => Some(d.to_string()),
                        (None, None) => None,
                    }
                })
                .collect()
        };
        self.put(FieldKey::DiagnosisList, numbered(&diagnoses));

        let therapies: Vec<String> = ctx
            .therapies
            .iter()
            .filter_map(|t| {
                let name = non_blank(t.therapy_type.as_deref())
                    .or(non_blank(t.description.as_deref()))?;
                let mut line = name.to_string();
                if let Some(span) = date_span(t.start_date.as_deref(), t.end_date.as_deref()) {
                    line.push_str(&format!(" ({span})"));
                }
                let mut details = Vec::new();
                if let Some(weeks) = t.duration_weeks {
                    details.push(format!("{} weeks", trim_number(weeks)));
                }
                if let Some(visits) = t.visits {
                    details.push(format!("{visits} visits"));
                }
                if !details.is_empty() {
                    line.push_str(&format!(", {}", details.join(", ")));
                }
                if let Some(outcome) = non_blank(t.outcome.as_deref()) {
                    line.push_str(&format!(": {outcome}"));
                }
                Some(line)
            })
            .collect();
        self.put(FieldKey::FailedTherapies, numbered(&therapies));

        let trials: Vec<String> = ctx
            .med_trials
            .iter()
            .filter_map(|m| {
                let mut line = non_blank(m.medication.as_deref())?.to_string();
                if let Some(dose) = non_blank(m.dose.as_deref()) {
                    line.push_str(&format!(" {dose}"));
                }
                if let Some(span) = date_span(m.start_date.as_deref(), m.end_date.as_deref()) {
                    line.push_str(&format!(" ({span})"));
                } else if let Some(weeks) = m.duration_weeks {
                    line.push_str(&format!(" ({} weeks)", trim_number(weeks)));
                }
                if let Some(outcome) = non_blank(m.outcome.as_deref()) {
                    line.push_str(&format!(": {outcome}"));
                }
                if let Some(reason) = non_blank(m.reason_stopped.as_deref()) {
                    line.push_str(&format!("; discontinued due to {reason}"));
                }
                Some(line)
            })
            .collect();
        self.put(FieldKey::MedicationTrials, numbered(&trials));

        let imaging: Vec<String> = ctx
            .imaging
            .iter()
            .filter_map(|i| {
                let subject = [i.modality.as_deref(), i.body_part.as_deref()]
                    .into_iter()
                    .filter_map(non_blank)
                    .collect::<Vec<_>>()
                    .join(" ");
                let date = non_blank(i.study_date.as_deref()).map(format_date_long);
                let findings = non_blank(i.findings.as_deref());
                let head = match date {
                    Some(d) if !subject.is_empty() => format!("{subject} ({d})"),
                    Some(d) => d,
                    None => subject,
                };
                match (head.is_empty(), findings) {
                    (true, None) => None,
                    (true, Some(f)) => Some(f.to_string()),
                    (false, Some(f)) => Some(format!("{head}: {f}")),
                    (false, None) => Some(head),
                }
            })
            .collect();
        self.put(FieldKey::ImagingFindings, semicolon_joined(&imaging));

        let encounters: Vec<String> = ctx
            .encounters
            .iter()
            .filter_map(|e| {
                let summary = non_blank(e.summary.as_deref())?;
                let mut head = Vec::new();
                if let Some(date) = non_blank(e.date.as_deref()) {
                    head.push(format_date_long(date));
                }
                if let Some(kind) = non_blank(e.encounter_type.as_deref()) {
                    head.push(kind.to_string());
                }
                if let Some(provider) = non_blank(e.provider_name.as_deref()) {
                    head.push(format!("with {provider}"));
                }
                Some(if head.is_empty() {
                    summary.to_string()
                } else {
                    format!("{}: {summary}", head.join(" "))
                })
            })
            .collect();
        self.put(FieldKey::EncounterSummaries, semicolon_joined(&encounters));
    }

    fn add_appeal(&mut self, ctx: &PhiReinsertionContext) {
        let Some(parent) = &ctx.parent_letter else {
            return;
        };
        self.put(FieldKey::DenialReason, parent.denial_reason.clone());
        self.put(FieldKey::DenialCode, parent.denial_code.clone());
        self.put(
            FieldKey::DenialDate,
            parent.denial_date.as_deref().map(format_date_long),
        );
        self.put(
            FieldKey::AppealDeadline,
            parent.appeal_deadline.as_deref().map(format_date_long),
        );
    }
}

fn date_span(start: Option<&str>, end: Option<&str>) -> Option<String> {
    match (non_blank(start), non_blank(end)) {
        (Some(s), Some(e)) => Some(format!("{} - {}", format_date_long(s), format_date_long(e))),
        (Some(s), None) => Some(format!("since {}", format_date_long(s))),
        (None, Some(e)) => Some(format!("until {}", format_date_long(e))),
        (None, None) => None,
    }
}

fn trim_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.1}")
    }
}

fn numbered(items: &[String]) -> Option<String> {
    if items.is_empty() {
        return None;
    }
    Some(
        items
            .iter()
            .enumerate()
            .map(|(idx, item)| format!("{}. {item}", idx + 1))
            .collect::<Vec<_>>()
            .join("\n"),
    )
}

fn semicolon_joined(items: &[String]) -> Option<String> {
    if items.is_empty() {
        None
    } else {
        Some(items.join("; "))
    }
}

fn join_non_empty(items: &[String], sep: &str) -> Option<String> {
    let kept: Vec<&str> = items.iter().filter_map(|i| non_blank(Some(i.as_str()))).collect();
    if kept.is_empty() {
        None
    } else {
        Some(kept.join(sep))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::context::{Facility, Provider};
    use crate::domain::record::{
        Address, AuthRequest, Coverage, Encounter, ImagingStudy, MedTrial, ParentLetter, Patient,
        Problem, Therapy,
    };

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    #[test]
    fn test_empty_context_only_has_dates() {
        let map = ReplacementMap::build(&PhiReinsertionContext::default(), today());
        assert_eq!(map.len(), 2);
        assert_eq!(map.get(FieldKey::CurrentDate), Some("June 1, 2024"));
        assert_eq!(map.get(FieldKey::CurrentDateShort), Some("06/01/2024"));
    }

    #[test]
    fn test_patient_fields() {
        let ctx = PhiReinsertionContext {
            patient: Some(Patient {
                first_name: Some("Jane".to_string()),
                last_name: Some("Doe".to_string()),
                dob: Some("1968-04-12".to_string()),
                phone: Some("15551234567".to_string()),
                email: Some(String::new()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let map = ReplacementMap::build(&ctx, today());
        assert_eq!(map.get(FieldKey::PatientFullName), Some("Jane Doe"));
        assert_eq!(map.get(FieldKey::PatientDob), Some("April 12, 1968"));
        assert_eq!(map.get(FieldKey::PatientDobShort), Some("04/12/1968"));
        assert_eq!(map.get(FieldKey::PatientAge), Some("56"));
        assert_eq!(map.get(FieldKey::PatientPhone), Some("(555) 123-4567"));
        assert_eq!(map.get(FieldKey::PatientEmail), Some(""));
        assert_eq!(map.get(FieldKey::PatientMrn), None);
    }

    #[test]
    fn test_coverage_facility_provider() {
        let ctx = PhiReinsertionContext {
            coverage: Some(Coverage {
                payer_name: Some("Aetna".to_string()),
                payer_fax: Some("555.987.6543".to_string()),
                ..Default::default()
            }),
            facility: Some(Facility {
                name: Some("Springfield Spine".to_string()),
                address: Some(Address {
                    line1: Some("12 Oak St".to_string()),
                    city: Some("Springfield".to_string()),
                    state: Some("IL".to_string()),
                    zip: Some("62701".to_string()),
                    ..Default::default()
                }),
                ..Default::default()
            }),
            provider: Some(Provider {
                full_name: Some("Alan Grant".to_string()),
                credentials: Some("MD".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let map = ReplacementMap::build(&ctx, today());
        assert_eq!(map.get(FieldKey::PayerFax), Some("(555) 987-6543"));
        assert_eq!(
            map.get(FieldKey::FacilityAddress),
            Some("12 Oak St, Springfield, IL 62701")
        );
        assert_eq!(map.get(FieldKey::ProviderSignature), Some("Alan Grant, MD"));
    }

    #[test]
    fn test_request_fallback_to_first_of_list() {
        let ctx = PhiReinsertionContext {
            requests: vec![AuthRequest {
                service_key: Some("lumbar_mri".to_string()),
                cpt_codes: vec!["72148".to_string(), " ".to_string()],
                requested_units: Some(1),
                requested_dos: Some("2024-07-01".to_string()),
                ..Default::default()
            }],
            ..Default::default()
        };
        let map = ReplacementMap::build(&ctx, today());
        assert_eq!(map.get(FieldKey::ServiceName), Some("lumbar_mri"));
        assert_eq!(map.get(FieldKey::CptCodes), Some("72148"));
        assert_eq!(map.get(FieldKey::RequestedUnits), Some("1"));
        assert_eq!(map.get(FieldKey::DateOfService), Some("July 1, 2024"));
        assert_eq!(map.get(FieldKey::Icd10Codes), None);
    }

    #[test]
    fn test_rendered_lists() {
        let ctx = PhiReinsertionContext {
            problems: vec![
                Problem {
                    icd10: Some("M54.16".to_string()),
                    description: Some("Lumbar radiculopathy".to_string()),
                    ..Default::default()
                },
                Problem {
                    description: Some("Obesity".to_string()),
                    ..Default::default()
                },
            ],
            therapies: vec![Therapy {
                therapy_type: Some("Physical therapy".to_string()),
                start_date: Some("2024-01-01".to_string()),
                end_date: Some("2024-02-12".to_string()),
                visits: Some(12),
                outcome: Some("minimal improvement".to_string()),
                ..Default::default()
            }],
            med_trials: vec![MedTrial {
                medication: Some("Gabapentin".to_string()),
                dose: Some("300 mg".to_string()),
                duration_weeks: Some(8.0),
                reason_stopped: Some("drowsiness".to_string()),
                ..Default::default()
            }],
            imaging: vec![ImagingStudy {
                modality: Some("MRI".to_string()),
                body_part: Some("lumbar spine".to_string()),
                study_date: Some("2024-03-05".to_string()),
                findings: Some("L4-L5 protrusion".to_string()),
            }],
            encounters: vec![
                Encounter {
                    date: Some("2024-04-01".to_string()),
                    encounter_type: Some("Office visit".to_string()),
                    summary: Some("Positive SLR".to_string()),
                    ..Default::default()
                },
                Encounter {
                    summary: Some("Phone follow-up".to_string()),
                    ..Default::default()
                },
            ],
            ..Default::default()
        };
        let map = ReplacementMap::build(&ctx, today());

        assert_eq!(
            map.get(FieldKey::DiagnosisList),
            Some("1. M54.16 - Lumbar radiculopathy\n2. Obesity")
        );
        assert_eq!(
            map.get(FieldKey::FailedTherapies),
            Some("1. Physical therapy (January 1, 2024 - February 12, 2024), 12 visits: minimal improvement")
        );
        assert_eq!(
            map.get(FieldKey::MedicationTrials),
            Some("1. Gabapentin 300 mg (8 weeks); discontinued due to drowsiness")
        );
        assert_eq!(
            map.get(FieldKey::ImagingFindings),
            Some("MRI lumbar spine (March 5, 2024): L4-L5 protrusion")
        );
        assert_eq!(
            map.get(FieldKey::EncounterSummaries),
            Some("April 1, 2024 Office visit: Positive SLR; Phone follow-up")
        );
    }

    #[test]
    fn test_appeal_fields() {
        let ctx = PhiReinsertionContext {
            parent_letter: Some(ParentLetter {
                denial_reason: Some("Not medically necessary".to_string()),
                denial_code: Some("MN-01".to_string()),
                denial_date: Some("2024-05-02".to_string()),
                appeal_deadline: Some("2024-07-01".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let map = ReplacementMap::build(&ctx, today());
        assert_eq!(map.get(FieldKey::DenialDate), Some("May 2, 2024"));
        assert_eq!(map.get(FieldKey::AppealDeadline), Some("July 1, 2024"));
        assert_eq!(map.get(FieldKey::DenialCode), Some("MN-01"));
    }
}
