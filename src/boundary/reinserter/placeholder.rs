//! Placeholder grammar and typed placeholder keys
//!
//! The generation service marks every spot where PHI belongs with one of
//! three equivalent forms: `{{key}}`, `{key}` or `[MISSING: key]`. Matching
//! is case-insensitive and tolerates whitespace around the key.

use regex::{Captures, Regex};
use std::fmt;
use std::sync::LazyLock;

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\{\{\s*([a-z][a-z0-9_.]*)\s*\}\}|\{\s*([a-z][a-z0-9_.]*)\s*\}|\[MISSING:\s*([a-z][a-z0-9_.]*)\s*\]",
    )
    .expect("valid placeholder grammar")
});

static GREETING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?im)^\s*(?:dear\b|to whom it may concern|re:)").expect("valid greeting pattern")
});

static SIGN_OFF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:sincerely|respectfully|best regards|kind regards|regards)\b")
        .expect("valid sign-off pattern")
});

/// Every placeholder key the reinserter knows how to fill
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FieldKey {
    CurrentDate,
    CurrentDateShort,
    PatientFullName,
    PatientFirstName,
    PatientLastName,
    PatientDob,
    PatientDobShort,
    PatientAge,
    PatientSex,
    PatientPhone,
    PatientEmail,
    PatientAddress,
    PatientMrn,
    PatientId,
    PayerName,
    PlanType,
    MemberId,
    GroupId,
    SubscriberId,
    PayerPhone,
    PayerFax,
    PayerAddress,
    FacilityName,
    FacilityNpi,
    FacilityTaxId,
    FacilityPhone,
    FacilityFax,
    FacilityAddress,
    ProviderName,
    ProviderFirstName,
    ProviderLastName,
    ProviderCredentials,
    ProviderNpi,
    ProviderSpecialty,
    ProviderPhone,
    ProviderSignature,
    ServiceName,
    CptCodes,
    Icd10Codes,
    ClinicalQuestion,
    RequestedUnits,
    DateOfService,
    DateOfServiceShort,
    DiagnosisList,
    FailedTherapies,
    MedicationTrials,
    ImagingFindings,
    EncounterSummaries,
    DenialReason,
    DenialCode,
    DenialDate,
    AppealDeadline,
}

impl FieldKey {
    pub const ALL: [FieldKey; 52] = [
        Self::CurrentDate,
        Self::CurrentDateShort,
        Self::PatientFullName,
        Self::PatientFirstName,
        Self::PatientLastName,
        Self::PatientDob,
        Self::PatientDobShort,
        Self::PatientAge,
        Self::PatientSex,
        Self::PatientPhone,
        Self::PatientEmail,
        Self::PatientAddress,
        Self::PatientMrn,
        Self::PatientId,
        Self::PayerName,
        Self::PlanType,
        Self::MemberId,
        Self::GroupId,
        Self::SubscriberId,
        Self::PayerPhone,
        Self::PayerFax,
        Self::PayerAddress,
        Self::FacilityName,
        Self::FacilityNpi,
        Self::FacilityTaxId,
        Self::FacilityPhone,
        Self::FacilityFax,
        Self::FacilityAddress,
        Self::ProviderName,
        Self::ProviderFirstName,
        Self::ProviderLastName,
        Self::ProviderCredentials,
        Self::ProviderNpi,
        Self::ProviderSpecialty,
        Self::ProviderPhone,
        Self::ProviderSignature,
        Self::ServiceName,
        Self::CptCodes,
        Self::Icd10Codes,
        Self::ClinicalQuestion,
        Self::RequestedUnits,
        Self::DateOfService,
        Self::DateOfServiceShort,
        Self::DiagnosisList,
        Self::FailedTherapies,
        Self::MedicationTrials,
        Self::ImagingFindings,
        Self::EncounterSummaries,
        Self::DenialReason,
        Self::DenialCode,
        Self::DenialDate,
        Self::AppealDeadline,
    ];

    /// Canonical placeholder name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CurrentDate => "current_date",
            Self::CurrentDateShort => "current_date_short",
            Self::PatientFullName => "patient_full_name",
            Self::PatientFirstName => "patient_first_name",
            Self::PatientLastName => "patient_last_name",
            Self::PatientDob => "patient_dob",
            Self::PatientDobShort => "patient_dob_short",
            Self::PatientAge => "patient_age",
            Self::PatientSex => "patient_sex",
            Self::PatientPhone => "patient_phone",
            Self::PatientEmail => "patient_email",
            Self::PatientAddress => "patient_address",
            Self::PatientMrn => "patient_mrn",
            Self::PatientId => "patient_id",
            Self::PayerName => "payer_name",
            Self::PlanType => "plan_type",
            Self::MemberId => "member_id",
            Self::GroupId => "group_id",
            Self::SubscriberId => "subscriber_id",
            Self::PayerPhone => "payer_phone",
            Self::PayerFax => "payer_fax",
            Self::PayerAddress => "payer_address",
            Self::FacilityName => "facility_name",
            Self::FacilityNpi => "facility_npi",
            Self::FacilityTaxId => "facility_tax_id",
            Self::FacilityPhone => "facility_phone",
            Self::FacilityFax => "facility_fax",
            Self::FacilityAddress => "facility_address",
            Self::ProviderName => "provider_name",
            Self::ProviderFirstName => "provider_first_name",
            Self::ProviderLastName => "provider_last_name",
            Self::ProviderCredentials => "provider_credentials",
            Self::ProviderNpi => "provider_npi",
            Self::ProviderSpecialty => "provider_specialty",
            Self::ProviderPhone => "provider_phone",
            Self::ProviderSignature => "provider_signature",
            Self::ServiceName => "service_name",
            Self::CptCodes => "cpt_codes",
            Self::Icd10Codes => "icd10_codes",
            Self::ClinicalQuestion => "clinical_question",
            Self::RequestedUnits => "requested_units",
            Self::DateOfService => "date_of_service",
            Self::DateOfServiceShort => "date_of_service_short",
            Self::DiagnosisList => "diagnosis_list",
            Self::FailedTherapies => "failed_therapies",
            Self::MedicationTrials => "medication_trials",
            Self::ImagingFindings => "imaging_findings",
            Self::EncounterSummaries => "encounter_summaries",
            Self::DenialReason => "denial_reason",
            Self::DenialCode => "denial_code",
            Self::DenialDate => "denial_date",
            Self::AppealDeadline => "appeal_deadline",
        }
    }

    /// Parse a placeholder name, case-insensitively
    ///
    /// Dots read as underscores, so `patient.dob` is `patient_dob`.
    pub fn parse(raw: &str) -> Option<Self> {
        let name = normalize_name(raw);
        let aliased = match name.as_str() {
            "date" | "today" => Some(Self::CurrentDate),
            "patient_name" => Some(Self::PatientFullName),
            "dob" | "patient_date_of_birth" => Some(Self::PatientDob),
            "age" => Some(Self::PatientAge),
            "payer" | "insurance_name" | "coverage_payer_name" => Some(Self::PayerName),
            "provider_full_name" | "physician_name" => Some(Self::ProviderName),
            "requested_dos" | "dos" => Some(Self::DateOfService),
            "cpt" | "cpt_code" => Some(Self::CptCodes),
            "icd10" | "icd10_code" | "diagnosis_codes" => Some(Self::Icd10Codes),
            "diagnoses" => Some(Self::DiagnosisList),
            "therapies" | "prior_therapies" => Some(Self::FailedTherapies),
            "med_trials" => Some(Self::MedicationTrials),
            "imaging" => Some(Self::ImagingFindings),
            "encounters" => Some(Self::EncounterSummaries),
            _ => None,
        };
        aliased.or_else(|| Self::ALL.into_iter().find(|k| k.as_str() == name))
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Key named inside a placeholder
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PlaceholderKey {
    Known(FieldKey),
    /// Normalized name of a key the reinserter does not define
    Unknown(String),
}

impl PlaceholderKey {
    /// Classify a raw placeholder name
    pub fn parse(raw: &str) -> Self {
        match FieldKey::parse(raw) {
            Some(key) => Self::Known(key),
            None => Self::Unknown(normalize_name(raw)),
        }
    }
}

impl fmt::Display for PlaceholderKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Known(key) => f.write_str(key.as_str()),
            Self::Unknown(name) => f.write_str(name),
        }
    }
}

fn normalize_name(raw: &str) -> String {
    raw.trim().to_ascii_lowercase().replace('.', "_")
}

/// The compiled placeholder grammar
pub(crate) fn placeholder_regex() -> &'static Regex {
    &PLACEHOLDER
}

/// Key text captured by whichever of the three forms matched
pub(crate) fn captured_key<'t>(caps: &Captures<'t>) -> Option<&'t str> {
    caps.get(1)
        .or_else(|| caps.get(2))
        .or_else(|| caps.get(3))
        .map(|m| m.as_str())
}

/// Whether the text contains any placeholder
pub fn has_placeholders(text: &str) -> bool {
    PLACEHOLDER.is_match(text)
}

/// Heuristic: does the text read like a letter that reinsertion should touch
pub fn looks_like_document(text: &str) -> bool {
    has_placeholders(text) || (GREETING.is_match(text) && SIGN_OFF.is_match(text))
}

/// Placeholders still present in `text`, deduplicated in order of appearance
pub fn extract_unfilled_placeholders(text: &str) -> Vec<PlaceholderKey> {
    let mut keys: Vec<PlaceholderKey> = Vec::new();
    for caps in PLACEHOLDER.captures_iter(text) {
        if let Some(raw) = captured_key(&caps) {
            let key = PlaceholderKey::parse(raw);
            if !keys.contains(&key) {
                keys.push(key);
            }
        }
    }
    keys
}
