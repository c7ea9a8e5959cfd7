//! Integration tests for logging functionality
//!
//! The global subscriber can be installed once per process, so only one test
//! here calls `init_logging`.

use phi_boundary::boundary::{Firewall, PhiClassifier};
use phi_boundary::config::LoggingConfig;
use phi_boundary::domain::{BoundaryError, CaseId, ViolationKind};
use phi_boundary::logging::{init_logging, LOG_FILE_NAME};
use phi_boundary::{log_boundary_block, log_error_with_context, log_generation_complete};
use std::time::Duration;
use tempfile::TempDir;

#[test]
fn test_logging_config_default() {
    let config = LoggingConfig::default();
    assert!(config.local_enabled);
    assert_eq!(config.local_path, "./logs");
    assert_eq!(config.local_rotation, "daily");
}

#[test]
fn test_init_creates_log_directory_and_rejects_second_init() {
    let temp_dir = TempDir::new().unwrap();
    let log_path = temp_dir.path().join("logs");
    let config = LoggingConfig {
        local_enabled: true,
        local_path: log_path.to_string_lossy().to_string(),
        local_rotation: "never".to_string(),
    };
    assert!(!log_path.exists());

    let guard = init_logging("debug", &config).unwrap();
    assert!(log_path.is_dir());

    // Events from inside the crate pass the default `phi_boundary` filter
    let firewall = Firewall::new(PhiClassifier::new().unwrap());
    let payload = serde_json::json!({"request": {"member_id": "W123456789"}});
    assert!(firewall.assert_no_phi(&payload, &[]).is_err());

    // Call-site macros compile from outside the crate
    let case_id = CaseId::generate();
    log_boundary_block!(ViolationKind::BlockedKey, "request.member_id");
    log_generation_complete!(&case_id, 1usize, Duration::from_millis(42));
    log_error_with_context!(
        &BoundaryError::Validation("empty template".to_string()),
        "reinsertion"
    );

    // Flush the non-blocking writer
    drop(guard);
    let contents = std::fs::read_to_string(log_path.join(LOG_FILE_NAME)).unwrap();
    assert!(contents.contains("Outbound payload blocked: PHI detected"));
    assert!(contents.contains("request.member_id"));
    assert!(!contents.contains("W123456789"));

    let second = init_logging("info", &LoggingConfig {
        local_enabled: false,
        ..LoggingConfig::default()
    });
    assert!(matches!(second, Err(BoundaryError::Configuration(_))));
}

#[test]
fn test_invalid_level_fails_before_touching_disk() {
    let temp_dir = TempDir::new().unwrap();
    let log_path = temp_dir.path().join("never-created");
    let config = LoggingConfig {
        local_enabled: true,
        local_path: log_path.to_string_lossy().to_string(),
        local_rotation: "daily".to_string(),
    };

    let result = init_logging("verbose", &config);
    assert!(matches!(result, Err(BoundaryError::Configuration(_))));
    assert!(!log_path.exists());
}
