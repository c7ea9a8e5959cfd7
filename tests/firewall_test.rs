//! Integration tests for the outbound firewall
//!
//! Payloads here are built the way a caller would hand them to the network
//! layer: serialized packets, tampered packets and ad-hoc JSON.

use phi_boundary::boundary::{
    Deidentifier, DeidentifyOptions, Firewall, PhiClassifier, DEFAULT_SKIP_KEYS, FORBIDDEN_KEYS,
};
use phi_boundary::domain::{BoundaryError, LocalClinicalRecord, Patient, ViolationKind};
use serde::Serialize;
use serde_json::{json, Value};
use test_case::test_case;

fn firewall() -> Firewall {
    Firewall::new(PhiClassifier::new().unwrap())
}

fn packet_value() -> Value {
    let record = LocalClinicalRecord {
        patient: Some(Patient {
            first_name: Some("Jane".to_string()),
            last_name: Some("Doe".to_string()),
            dob: Some("1980-01-01".to_string()),
            ..Default::default()
        }),
        ..Default::default()
    };
    let packet = Deidentifier::new(PhiClassifier::new().unwrap(), "phi-boundary/test").deidentify(
        "fac-001",
        &record,
        &DeidentifyOptions::default(),
    );
    serde_json::to_value(&packet).unwrap()
}

#[test]
fn test_member_id_under_request_is_rejected() {
    let err = firewall()
        .assert_no_phi(&json!({"request": {"member_id": "12345"}}), &[])
        .unwrap_err();

    assert_eq!(err.kind, ViolationKind::BlockedKey);
    assert!(err.to_string().starts_with("ERROR: PHI detected"));
    assert!(err.to_string().contains("request.member_id"));
    assert!(!err.to_string().contains("12345"));
}

#[test]
fn test_every_forbidden_key_is_rejected_when_nested() {
    let fw = firewall();
    for key in FORBIDDEN_KEYS {
        let mut inner = serde_json::Map::new();
        inner.insert(key.to_string(), json!("x"));
        let payload = json!({"clinical": Value::Object(inner)});

        let err = fw.assert_no_phi(&payload, &DEFAULT_SKIP_KEYS).unwrap_err();
        assert_eq!(err.kind, ViolationKind::BlockedKey, "key {key}");
        assert_eq!(err.path, format!("clinical.{key}"));
    }
}

#[test]
fn test_nested_dob_reports_full_path() {
    let payload = json!({"a": {"b": [{"ok": "fine"}, {"c": {"dob": "1980-01-01"}}]}});
    let err = firewall().assert_no_phi(&payload, &[]).unwrap_err();
    assert_eq!(err.path, "a.b[1].c.dob");
}

#[test_case("Patient email jane.doe@example.com" ; "email")]
#[test_case("call 555-123-4567" ; "phone")]
#[test_case("ssn 123-45-6789" ; "ssn")]
#[test_case("seen on 2024-03-10" ; "iso date")]
#[test_case("seen on 3/10/24" ; "short date")]
#[test_case("lives near 62701-1234" ; "zip plus four")]
#[test_case("Member ID on file" ; "member id label")]
#[test_case("MRN: withheld" ; "mrn label")]
fn test_phi_text_in_summary_is_rejected(text: &str) {
    let mut payload = packet_value();
    payload["clinical"]["summaries"] = json!(["Low back pain", text]);

    let err = firewall()
        .assert_no_phi(&payload, &DEFAULT_SKIP_KEYS)
        .unwrap_err();
    assert_eq!(err.kind, ViolationKind::BlockedText);
    assert_eq!(err.path, "clinical.summaries[1]");
}

#[test]
fn test_untouched_packet_passes() {
    let payload = packet_value();
    assert!(firewall().assert_no_phi(&payload, &DEFAULT_SKIP_KEYS).is_ok());
}

#[test]
fn test_tampered_patient_ref_is_rejected() {
    let mut payload = packet_value();
    payload["patient"]["patient_ref"] = json!("LOCAL-000123");

    let err = firewall()
        .assert_no_phi(&payload, &DEFAULT_SKIP_KEYS)
        .unwrap_err();
    assert_eq!(err.kind, ViolationKind::BlockedPatientRef);
    assert_eq!(err.path, "patient.patient_ref");
}

#[test]
fn test_audit_stamp_checked_without_skip_keys() {
    let mut payload = packet_value();
    payload["audit"]["generated_at"] = json!("2024-06-01");

    let fw = firewall();
    assert!(fw.assert_no_phi(&payload, &DEFAULT_SKIP_KEYS).is_ok());
    let err = fw.assert_no_phi(&payload, &[]).unwrap_err();
    assert_eq!(err.path, "audit.generated_at");
}

#[test]
fn test_codes_pass_only_under_code_keys() {
    let fw = firewall();
    let mut payload = packet_value();
    payload["request"]["cpt"] = json!(["72148"]);
    payload["request"]["diagnoses"] = json!(["M54.16", "Z79.899"]);
    assert!(fw.assert_no_phi(&payload, &DEFAULT_SKIP_KEYS).is_ok());

    payload["clinical"]["summaries"] = json!(["72148"]);
    let err = fw.assert_no_phi(&payload, &DEFAULT_SKIP_KEYS).unwrap_err();
    assert_eq!(err.path, "clinical.summaries[0]");
}

#[test]
fn test_assert_serializable_on_caller_struct() {
    #[derive(Serialize)]
    struct Envelope {
        facility_id: String,
        note: String,
    }

    let fw = firewall();
    let clean = Envelope {
        facility_id: "fac-001".to_string(),
        note: "follow-up requested".to_string(),
    };
    assert!(fw.assert_serializable(&clean, &["facility_id"]).is_ok());

    let dirty = Envelope {
        facility_id: "fac-001".to_string(),
        note: "reach me at jane@example.com".to_string(),
    };
    let err = fw.assert_serializable(&dirty, &["facility_id"]).unwrap_err();
    assert!(matches!(err, BoundaryError::PhiDetected(ref e) if e.path == "note"));
    assert!(err.is_phi_detected());
    assert!(err.user_message().contains("Nothing was sent"));
}
