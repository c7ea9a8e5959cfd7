//! Logging and observability
//!
//! Structured `tracing` logging with a console layer and an optional rotating
//! JSON file. The macros below are the only place boundary events are
//! phrased, so no call site can slip a field value into a log line.
//!
//! # Example
//!
//! ```no_run
//! use phi_boundary::config::LoggingConfig;
//! use phi_boundary::logging::init_logging;
//!
//! let _guard = init_logging("info", &LoggingConfig::default())?;
//! tracing::info!("Application started");
//! # Ok::<(), phi_boundary::domain::BoundaryError>(())
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard, LOG_FILE_NAME};

/// Log a firewall block by rule and key path
///
/// # Example
///
/// ```no_run
/// use phi_boundary::domain::ViolationKind;
/// use phi_boundary::log_boundary_block;
///
/// log_boundary_block!(ViolationKind::BlockedKey, "request.member_id");
/// ```
#[macro_export]
macro_rules! log_boundary_block {
    ($kind:expr, $path:expr) => {
        tracing::warn!(
            kind = %$kind,
            path = %$path,
            "Outbound payload blocked: PHI detected"
        );
    };
}

/// Log the end of a letter generation run
///
/// # Example
///
/// ```no_run
/// use phi_boundary::domain::CaseId;
/// use phi_boundary::log_generation_complete;
/// use std::time::Duration;
///
/// let case_id = CaseId::generate();
/// log_generation_complete!(&case_id, 0usize, Duration::from_millis(850));
/// ```
#[macro_export]
macro_rules! log_generation_complete {
    ($case_id:expr, $unfilled:expr, $duration:expr) => {
        tracing::info!(
            case_id = %$case_id,
            unfilled = $unfilled,
            duration_ms = $duration.as_millis() as u64,
            "Letter generation completed"
        );
    };
}

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use phi_boundary::domain::BoundaryError;
/// use phi_boundary::log_error_with_context;
///
/// let error = BoundaryError::Configuration("missing endpoint".to_string());
/// log_error_with_context!(&error, "Failed to start generation");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}

#[cfg(test)]
mod tests {
    use crate::domain::{BoundaryError, CaseId, ViolationKind};
    use std::time::Duration;

    #[test]
    fn test_macros_expand_without_subscriber() {
        let case_id = CaseId::generate();
        log_boundary_block!(ViolationKind::BlockedText, "clinical.summaries[0]");
        log_generation_complete!(&case_id, 2usize, Duration::from_millis(10));
        log_error_with_context!(
            &BoundaryError::Validation("empty".to_string()),
            "reinsertion"
        );
    }
}
