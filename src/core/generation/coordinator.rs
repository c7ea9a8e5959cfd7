//! Letter coordinator - orchestrates one letter generation run
//!
//! De-identify, audit, firewall, generate remotely, then reinsert PHI
//! locally. Holds no per-run state, so one coordinator can serve concurrent
//! requests.

use super::outcome::LetterOutcome;
use crate::adapters::generation::GenerationService;
use crate::boundary::{
    extract_unfilled_placeholders, looks_like_document, validate_context, BoundaryAuditLogger,
    Deidentifier, DeidentifyOptions, Firewall, Reinserter,
};
use crate::config::PhiBoundaryConfig;
use crate::domain::{
    BoundaryError, CaseId, Facility, LocalClinicalRecord, PhiDetectedError,
    PhiReinsertionContext, Provider, Result,
};
use std::sync::Arc;
use std::time::Instant;

/// Per-letter inputs besides the record itself
#[derive(Debug, Clone, Default)]
pub struct LetterRequest {
    /// Staff-chosen facility id stamped into the packet
    pub facility_id: String,
    /// Service, payer and units overrides
    pub options: DeidentifyOptions,
    /// Facility details for reinsertion
    pub facility: Option<Facility>,
    /// Signing provider for reinsertion
    pub provider: Option<Provider>,
}

impl LetterRequest {
    /// Request for `facility_id` with no overrides
    pub fn new(facility_id: impl Into<String>) -> Self {
        Self {
            facility_id: facility_id.into(),
            ..Default::default()
        }
    }

    /// Request using the facility and provider from configuration
    pub fn from_config(config: &PhiBoundaryConfig) -> Self {
        Self {
            facility_id: config.facility_id().unwrap_or_default().to_string(),
            options: DeidentifyOptions::default(),
            facility: config.facility.clone(),
            provider: config.provider.clone(),
        }
    }
}

/// Letter coordinator
pub struct LetterCoordinator {
    deidentifier: Deidentifier,
    firewall: Firewall,
    skip_keys: Vec<String>,
    service: Arc<dyn GenerationService>,
    reinserter: Option<Reinserter>,
    audit: Arc<BoundaryAuditLogger>,
}

impl LetterCoordinator {
    /// Create a coordinator from explicit parts
    pub fn new(
        deidentifier: Deidentifier,
        firewall: Firewall,
        skip_keys: Vec<String>,
        service: Arc<dyn GenerationService>,
        audit: Arc<BoundaryAuditLogger>,
    ) -> Self {
        Self {
            deidentifier,
            firewall,
            skip_keys,
            service,
            reinserter: None,
            audit,
        }
    }

    /// Create a coordinator wired from configuration
    ///
    /// The de-identifier and firewall share one classifier built from
    /// `[boundary]`.
    pub fn from_config(
        config: &PhiBoundaryConfig,
        service: Arc<dyn GenerationService>,
    ) -> Result<Self> {
        let classifier = config
            .boundary
            .classifier()
            .map_err(|e| BoundaryError::Configuration(format!("{e:#}")))?;
        let audit = config
            .boundary
            .audit
            .logger()
            .map_err(|e| BoundaryError::Configuration(format!("{e:#}")))?;

        Ok(Self::new(
            Deidentifier::new(classifier.clone(), config.boundary.generator_version.clone()),
            Firewall::new(classifier),
            config.boundary.skip_keys.clone(),
            service,
            Arc::new(audit),
        ))
    }

    /// Use a fixed reinserter (and so a fixed current date)
    ///
    /// Without one, every run is dated with the local date at reinsertion.
    pub fn with_reinserter(mut self, reinserter: Reinserter) -> Self {
        self.reinserter = Some(reinserter);
        self
    }

    fn reinserter(&self) -> Reinserter {
        self.reinserter.unwrap_or_else(Reinserter::new)
    }

    /// Run the full pipeline for one record
    ///
    /// # Errors
    ///
    /// - [`BoundaryError::PhiDetected`] if the packet fails the firewall;
    ///   nothing is sent
    /// - [`BoundaryError::Generation`] if the remote service fails
    pub async fn generate_letter(
        &self,
        record: &LocalClinicalRecord,
        request: &LetterRequest,
    ) -> Result<LetterOutcome> {
        let start = Instant::now();

        let packet = self
            .deidentifier
            .deidentify(&request.facility_id, record, &request.options);
        let case_id = packet.case_id.clone();
        tracing::info!(case_id = %case_id, service = self.service.name(), "Starting letter generation");
        self.record_audit(self.audit.log_packet_built(&packet));

        let skip: Vec<&str> = self.skip_keys.iter().map(String::as_str).collect();
        if let Err(err) = self.firewall.assert_serializable(&packet, &skip) {
            self.audit_failure(&case_id, &err);
            return Err(err);
        }
        self.record_audit(self.audit.log_firewall_passed(&packet));

        let template = match self.service.generate(&packet).await {
            Ok(template) => template,
            Err(err) => {
                self.audit_failure(&case_id, &err);
                return Err(err);
            }
        };

        let placeholders = extract_unfilled_placeholders(template.as_str());
        self.record_audit(
            self.audit
                .log_template_received(&case_id, placeholders.len()),
        );

        let ctx = PhiReinsertionContext::from_record(
            record,
            request.facility.clone(),
            request.provider.clone(),
        );
        let validation = validate_context(&ctx);
        if !validation.is_valid() {
            tracing::warn!(
                case_id = %case_id,
                missing = ?validation.missing,
                "Reinsertion context is incomplete"
            );
        }

        let reinserted = looks_like_document(template.as_str());
        let document = if reinserted {
            self.reinserter().reinsert(template.as_str(), &ctx)
        } else {
            tracing::warn!(case_id = %case_id, "Generated text does not look like a letter; reinsertion skipped");
            template.into_inner()
        };

        let unfilled: Vec<String> = extract_unfilled_placeholders(&document)
            .iter()
            .map(ToString::to_string)
            .collect();
        self.record_audit(self.audit.log_reinsertion_completed(&case_id, unfilled.len()));

        let duration = start.elapsed();
        crate::log_generation_complete!(&case_id, unfilled.len(), duration);

        Ok(LetterOutcome {
            case_id,
            document,
            unfilled,
            context_missing: validation.missing,
            reinserted,
            duration,
        })
    }

    fn audit_failure(&self, case_id: &CaseId, err: &BoundaryError) {
        if let BoundaryError::PhiDetected(detected) = err {
            self.record_blocked(case_id, detected);
        }
    }

    fn record_blocked(&self, case_id: &CaseId, detected: &PhiDetectedError) {
        self.record_audit(self.audit.log_firewall_blocked(Some(case_id), detected));
    }

    /// Audit write failures are logged and do not stop the run
    fn record_audit(&self, result: anyhow::Result<()>) {
        if let Err(e) = result {
            tracing::warn!(error = %e, "Failed to write audit entry");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boundary::PhiClassifier;
    use crate::domain::{
        AuthRequest, Coverage, DeidentifiedPacket, GenerationError, Patient, TemplateText,
    };
    use async_trait::async_trait;
    use chrono::{Local, NaiveDate};
    use std::sync::Mutex;
    use tempfile::tempdir;

    /// Returns a fixed template and remembers the packets it saw
    struct StubService {
        template: String,
        seen: Mutex<Vec<DeidentifiedPacket>>,
    }

    impl StubService {
        fn new(template: &str) -> Self {
            Self {
                template: template.to_string(),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl GenerationService for StubService {
        async fn generate(&self, packet: &DeidentifiedPacket) -> Result<TemplateText> {
            self.seen.lock().unwrap().push(packet.clone());
            Ok(TemplateText::new(self.template.clone()))
        }

        fn name(&self) -> &str {
            "stub"
        }
    }

    struct FailingService;

    #[async_trait]
    impl GenerationService for FailingService {
        async fn generate(&self, _packet: &DeidentifiedPacket) -> Result<TemplateText> {
            Err(GenerationError::ServerError {
                status: 503,
                message: "unavailable".to_string(),
            }
            .into())
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    fn record() -> LocalClinicalRecord {
        LocalClinicalRecord {
            patient: Some(Patient {
                id: Some("p-1".to_string()),
                full_name: Some("Jane Doe".to_string()),
                dob: Some("1968-04-12".to_string()),
                ..Default::default()
            }),
            coverages: vec![Coverage {
                payer_name: Some("Aetna".to_string()),
                member_id: Some("W123456789".to_string()),
                ..Default::default()
            }],
            requests: vec![AuthRequest {
                service_name: Some("Lumbar MRI".to_string()),
                cpt_codes: vec!["72148".to_string()],
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    fn coordinator(
        service: Arc<dyn GenerationService>,
        audit: BoundaryAuditLogger,
    ) -> LetterCoordinator {
        let classifier = PhiClassifier::new().unwrap();
        LetterCoordinator::new(
            Deidentifier::new(classifier.clone(), "phi-boundary/test"),
            Firewall::new(classifier),
            vec!["facility_id".to_string(), "audit".to_string()],
            service,
            Arc::new(audit),
        )
        .with_reinserter(Reinserter::with_today(
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
        ))
    }

    #[tokio::test]
    async fn test_generate_letter_fills_placeholders() {
        let service = Arc::new(StubService::new(
            "Dear {{payer_name}},\nRe: {{patient_full_name}} ({member_id})\nSincerely,\nClinic",
        ));
        let coordinator = coordinator(service.clone(), BoundaryAuditLogger::disabled());

        let outcome = coordinator
            .generate_letter(&record(), &LetterRequest::new("fac-1"))
            .await
            .unwrap();

        assert!(outcome.reinserted);
        assert_eq!(
            outcome.document,
            "Dear Aetna,\nRe: Jane Doe (W123456789)\nSincerely,\nClinic"
        );
        assert!(outcome.unfilled.is_empty());
        assert!(!outcome.needs_review());

        let seen = service.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        let wire = serde_json::to_string(&seen[0]).unwrap();
        assert!(!wire.contains("Jane"));
        assert!(!wire.contains("W123456789"));
        assert_eq!(seen[0].case_id, outcome.case_id);
    }

    #[tokio::test]
    async fn test_unfilled_placeholders_flag_review() {
        let service = Arc::new(StubService::new("Dear {{payer_name}}, NPI {{provider_npi}}"));
        let coordinator = coordinator(service, BoundaryAuditLogger::disabled());

        let outcome = coordinator
            .generate_letter(&record(), &LetterRequest::new("fac-1"))
            .await
            .unwrap();

        assert_eq!(outcome.unfilled, vec!["provider_npi".to_string()]);
        assert!(outcome.needs_review());
    }

    #[tokio::test]
    async fn test_non_document_is_returned_untouched() {
        let service = Arc::new(StubService::new("I cannot help with that."));
        let coordinator = coordinator(service, BoundaryAuditLogger::disabled());

        let outcome = coordinator
            .generate_letter(&record(), &LetterRequest::new("fac-1"))
            .await
            .unwrap();

        assert!(!outcome.reinserted);
        assert_eq!(outcome.document, "I cannot help with that.");
        assert!(outcome.needs_review());
    }

    #[tokio::test]
    async fn test_generation_failure_propagates() {
        let coordinator = coordinator(Arc::new(FailingService), BoundaryAuditLogger::disabled());

        let err = coordinator
            .generate_letter(&record(), &LetterRequest::new("fac-1"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            BoundaryError::Generation(GenerationError::ServerError { status: 503, .. })
        ));
    }

    #[tokio::test]
    async fn test_phi_facility_id_blocked_without_skip() {
        let dir = tempdir().unwrap();
        let log_path = dir.path().join("boundary.log");
        let audit = BoundaryAuditLogger::new(log_path.clone(), true, true).unwrap();

        let service = Arc::new(StubService::new("Dear {{payer_name}}"));
        let classifier = PhiClassifier::new().unwrap();
        let coordinator = LetterCoordinator::new(
            Deidentifier::new(classifier.clone(), "phi-boundary/test"),
            Firewall::new(classifier),
            vec!["audit".to_string()],
            service.clone(),
            Arc::new(audit),
        );

        let err = coordinator
            .generate_letter(&record(), &LetterRequest::new("jane.doe@example.com"))
            .await
            .unwrap_err();

        assert!(err.is_phi_detected());
        assert!(service.seen.lock().unwrap().is_empty());

        let content = std::fs::read_to_string(&log_path).unwrap();
        assert!(content.contains("firewall_blocked"));
        assert!(content.contains("\"path\":\"facility_id\""));
        assert!(!content.contains("jane.doe"));
    }

    #[test]
    fn test_unpinned_coordinator_dates_each_run() {
        let classifier = PhiClassifier::new().unwrap();
        let unpinned = LetterCoordinator::new(
            Deidentifier::new(classifier.clone(), "phi-boundary/test"),
            Firewall::new(classifier),
            vec![],
            Arc::new(FailingService),
            Arc::new(BoundaryAuditLogger::disabled()),
        );
        assert!(unpinned.reinserter.is_none());
        assert_eq!(unpinned.reinserter().today(), Local::now().date_naive());

        let pinned = coordinator(Arc::new(FailingService), BoundaryAuditLogger::disabled());
        assert_eq!(
            pinned.reinserter().today(),
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
        );
    }

    #[tokio::test]
    async fn test_pinned_date_fills_current_date() {
        let service = Arc::new(StubService::new("Dear {{payer_name}},\nDated {{current_date}}\nSincerely"));
        let coordinator = coordinator(service, BoundaryAuditLogger::disabled());

        let outcome = coordinator
            .generate_letter(&record(), &LetterRequest::new("fac-1"))
            .await
            .unwrap();

        assert_eq!(outcome.document, "Dear Aetna,\nDated June 1, 2024\nSincerely");
    }
}
