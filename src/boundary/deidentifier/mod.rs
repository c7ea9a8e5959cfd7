//! De-identification of the local clinical record
//!
//! Turns a [`LocalClinicalRecord`] into the [`DeidentifiedPacket`] that is
//! allowed to leave the device. Every free-text value goes through the
//! shared [`PhiClassifier`]; identifiers are replaced by a fresh case id;
//! codes are emitted only when they are code-shaped. Missing data never
//! fails, it just yields `None` or an empty list.

pub mod age;
pub mod therapy;

use crate::boundary::classifier::PhiClassifier;
use crate::boundary::codes::{normalize_cpt, normalize_icd10};
use crate::boundary::dates::weeks_between;
use crate::domain::ids::CaseId;
use crate::domain::packet::{
    DeidentifiedPacket, PacketAudit, PacketClinical, PacketCoverage, PacketImaging, PacketPatient,
    PacketRequest, DEFAULT_GENERATOR_VERSION,
};
use crate::domain::record::{non_blank, LocalClinicalRecord};
use chrono::{DateTime, Datelike, Utc};

/// Max chars of the sanitized clinical question
pub const MAX_QUESTION_LEN: usize = 200;
/// Max chars of a problem summary
pub const MAX_PROBLEM_LEN: usize = 160;
/// Max chars of a therapy summary
pub const MAX_THERAPY_LEN: usize = 160;
/// Max chars of an imaging finding
pub const MAX_FINDING_LEN: usize = 200;
/// Max chars of an encounter summary
pub const MAX_ENCOUNTER_LEN: usize = 160;
/// Max chars of a medication-trial summary
pub const MAX_MED_TRIAL_LEN: usize = 160;

const MAX_SUMMARIES: usize = 12;
const MAX_MODALITIES: usize = 6;
const MAX_FINDINGS: usize = 6;
const MAX_ENCOUNTERS: usize = 8;
const MAX_MED_TRIALS: usize = 8;
const MAX_CODES: usize = 12;

/// Caller overrides for the normalized keys
#[derive(Debug, Clone, Default)]
pub struct DeidentifyOptions {
    pub service_key: Option<String>,
    pub payer_key: Option<String>,
    pub requested_units: Option<u32>,
}

/// Builds de-identified packets
#[derive(Clone)]
pub struct Deidentifier {
    classifier: PhiClassifier,
    generator_version: String,
}

impl Deidentifier {
    /// Create a de-identifier stamping packets with `generator_version`
    pub fn new(classifier: PhiClassifier, generator_version: impl Into<String>) -> Self {
        Self {
            classifier,
            generator_version: generator_version.into(),
        }
    }

    /// Classifier used for sanitization
    pub fn classifier(&self) -> &PhiClassifier {
        &self.classifier
    }

    /// De-identify `record` for `facility_id`
    pub fn deidentify(
        &self,
        facility_id: &str,
        record: &LocalClinicalRecord,
        options: &DeidentifyOptions,
    ) -> DeidentifiedPacket {
        self.deidentify_at(facility_id, record, options, Utc::now())
    }

    /// De-identify against a fixed clock
    pub fn deidentify_at(
        &self,
        facility_id: &str,
        record: &LocalClinicalRecord,
        options: &DeidentifyOptions,
        now: DateTime<Utc>,
    ) -> DeidentifiedPacket {
        let case_id = CaseId::generate_at(now);

        let patient = PacketPatient {
            patient_ref: case_id.patient_ref(),
            age_band: record
                .patient
                .as_ref()
                .and_then(|p| age::age_band(p.dob.as_deref(), now.year()))
                .map(str::to_string),
            sex: record
                .patient
                .as_ref()
                .and_then(|p| normalize_sex(p.sex.as_deref()))
                .map(str::to_string),
        };

        let packet = DeidentifiedPacket {
            facility_id: facility_id.to_string(),
            patient,
            coverage: self.coverage(record, options),
            request: self.request(record, options),
            clinical: self.clinical(record),
            audit: PacketAudit::new(now, self.generator_version.clone()),
            case_id,
        };

        tracing::debug!(
            case_id = %packet.case_id,
            summaries = packet.clinical.summaries.len(),
            cpt = packet.request.cpt.len(),
            diagnoses = packet.request.diagnoses.len(),
            findings = packet.clinical.imaging.findings.len(),
            encounters = packet.clinical.encounter_summaries.len(),
            med_trials = packet.clinical.med_trial_summaries.len(),
            "Built de-identified packet"
        );

        packet
    }

    fn coverage(&self, record: &LocalClinicalRecord, options: &DeidentifyOptions) -> PacketCoverage {
        let coverage = record.primary_coverage();
        let payer_source = options.payer_key.as_deref().or_else(|| {
            coverage.and_then(|c| {
                non_blank(c.payer_key.as_deref()).or(non_blank(c.payer_name.as_deref()))
            })
        });

        PacketCoverage {
            payer_key: payer_source.and_then(|p| self.classifier.normalize_key(p)),
            plan_type: coverage
                .and_then(|c| c.plan_type.as_deref())
                .and_then(|p| self.classifier.normalize_key(p)),
        }
    }

    fn request(&self, record: &LocalClinicalRecord, options: &DeidentifyOptions) -> PacketRequest {
        let request = record.primary_request();
        let service_source = options.service_key.as_deref().or_else(|| {
            request.and_then(|r| {
                non_blank(r.service_key.as_deref()).or(non_blank(r.service_name.as_deref()))
            })
        });

        let mut cpt = Vec::new();
        for code in request.into_iter().flat_map(|r| &r.cpt_codes) {
            if let Some(code) = normalize_cpt(code) {
                push_unique(&mut cpt, code, MAX_CODES);
            }
        }

        let problem_codes = record.problems.iter().filter_map(|p| p.icd10.as_deref());
        let request_codes = request
            .into_iter()
            .flat_map(|r| r.icd10_codes.iter().map(String::as_str));
        let mut diagnoses = Vec::new();
        for code in problem_codes.chain(request_codes) {
            if let Some(code) = normalize_icd10(code) {
                push_unique(&mut diagnoses, code, MAX_CODES);
            }
        }

        PacketRequest {
            service_key: service_source.and_then(|s| self.classifier.normalize_key(s)),
            cpt,
            diagnoses,
            requested_units: options
                .requested_units
                .or(request.and_then(|r| r.requested_units)),
        }
    }

    fn clinical(&self, record: &LocalClinicalRecord) -> PacketClinical {
        let mut summaries = Vec::new();

        let question = record
            .primary_request()
            .and_then(|r| r.clinical_question.as_deref());
        if let Some(q) = question.and_then(|q| self.clean(q, MAX_QUESTION_LEN)) {
            push_unique(&mut summaries, q, MAX_SUMMARIES);
        }

        for problem in &record.problems {
            let code = problem.icd10.as_deref().and_then(normalize_icd10);
            let text = join_parts(&[
                code.as_deref(),
                problem.description.as_deref(),
                problem.status.as_deref().map(|s| format!("({s})")).as_deref(),
            ]);
            if let Some(s) = self.clean(&text, MAX_PROBLEM_LEN) {
                push_unique(&mut summaries, s, MAX_SUMMARIES);
            }
        }

        for entry in &record.therapies {
            let weeks = therapy::therapy_weeks(entry).map(|w| format!("{} weeks", format_weeks(w)));
            let visits = entry.visits.map(|v| format!("{v} visits"));
            let head = join_parts(&[
                entry.therapy_type.as_deref(),
                weeks.as_deref(),
                visits.as_deref(),
            ]);
            let text = match non_blank(entry.outcome.as_deref()) {
                Some(outcome) if !head.is_empty() => format!("{head}: {outcome}"),
                Some(outcome) => outcome.to_string(),
                None => head,
            };
            if let Some(s) = self.clean(&text, MAX_THERAPY_LEN) {
                push_unique(&mut summaries, s, MAX_SUMMARIES);
            }
        }

        PacketClinical {
            summaries,
            conservative_tx: therapy::aggregate(&record.therapies, &self.classifier),
            imaging: self.imaging(record),
            encounter_summaries: self.encounters(record),
            med_trial_summaries: self.med_trials(record),
        }
    }

    fn imaging(&self, record: &LocalClinicalRecord) -> PacketImaging {
        let mut modalities = Vec::new();
        let mut findings = Vec::new();

        for study in &record.imaging {
            if let Some(m) = study
                .modality
                .as_deref()
                .and_then(|m| self.classifier.normalize_key(m))
            {
                push_unique(&mut modalities, m, MAX_MODALITIES);
            }

            let Some(result) = non_blank(study.findings.as_deref()) else {
                continue;
            };
            let subject = join_parts(&[study.modality.as_deref(), study.body_part.as_deref()]);
            let text = if subject.is_empty() {
                result.to_string()
            } else {
                format!("{subject}: {result}")
            };
            if let Some(s) = self.clean(&text, MAX_FINDING_LEN) {
                push_unique(&mut findings, s, MAX_FINDINGS);
            }
        }

        PacketImaging {
            has_imaging: !record.imaging.is_empty(),
            modalities,
            findings,
        }
    }

    // Encounter date and provider name stay local.
    fn encounters(&self, record: &LocalClinicalRecord) -> Vec<String> {
        let mut out = Vec::new();
        for encounter in &record.encounters {
            let Some(summary) = non_blank(encounter.summary.as_deref()) else {
                continue;
            };
            let text = match non_blank(encounter.encounter_type.as_deref()) {
                Some(kind) => format!("{kind}: {summary}"),
                None => summary.to_string(),
            };
            if let Some(s) = self.clean(&text, MAX_ENCOUNTER_LEN) {
                push_unique(&mut out, s, MAX_ENCOUNTERS);
            }
        }
        out
    }

    fn med_trials(&self, record: &LocalClinicalRecord) -> Vec<String> {
        let mut out = Vec::new();
        for trial in &record.med_trials {
            let weeks = trial
                .duration_weeks
                .filter(|w| w.is_finite() && *w >= 0.0)
                .or_else(|| weeks_between(trial.start_date.as_deref(), trial.end_date.as_deref()))
                .map(|w| format!("{} weeks", format_weeks(w)));
            let stopped = non_blank(trial.reason_stopped.as_deref()).map(|r| format!("stopped: {r}"));
            let name = join_parts(&[trial.medication.as_deref(), trial.dose.as_deref()]);
            let text = [
                Some(name.as_str()),
                weeks.as_deref(),
                trial.outcome.as_deref(),
                stopped.as_deref(),
            ]
            .into_iter()
            .filter_map(non_blank)
            .collect::<Vec<_>>()
            .join(", ");
            if let Some(s) = self.clean(&text, MAX_MED_TRIAL_LEN) {
                push_unique(&mut out, s, MAX_MED_TRIALS);
            }
        }
        out
    }

    fn clean(&self, text: &str, max_len: usize) -> Option<String> {
        self.classifier.clean_field(text, max_len)
    }
}

impl Default for Deidentifier {
    fn default() -> Self {
        Self::new(
            PhiClassifier::new().expect("built-in pattern library compiles"),
            DEFAULT_GENERATOR_VERSION,
        )
    }
}

/// `female` / `male` / `other`; `None` when absent
pub fn normalize_sex(raw: Option<&str>) -> Option<&'static str> {
    let value = non_blank(raw)?.to_ascii_lowercase();
    Some(match value.as_str() {
        "f" | "female" | "woman" => "female",
        "m" | "male" | "man" => "male",
        _ => "other",
    })
}

fn format_weeks(weeks: f64) -> String {
    if weeks.fract() == 0.0 {
        format!("{weeks:.0}")
    } else {
        format!("{weeks:.1}")
    }
}

/// Non-blank parts joined with single spaces
fn join_parts(parts: &[Option<&str>]) -> String {
    parts
        .iter()
        .filter_map(|p| non_blank(*p))
        .collect::<Vec<_>>()
        .join(" ")
}

fn push_unique(list: &mut Vec<String>, value: String, cap: usize) {
    if list.len() < cap && !list.contains(&value) {
        list.push(value);
    }
}
