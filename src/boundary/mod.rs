//! PHI boundary pipeline
//!
//! The three components that keep patient information on the device:
//!
//! - [`Deidentifier`]: local record → [`DeidentifiedPacket`](crate::domain::DeidentifiedPacket)
//! - [`Firewall`]: hard stop before any outbound payload
//! - [`Reinserter`]: template with placeholders → filled letter, locally
//!
//! The de-identifier and firewall share one compiled pattern library via
//! [`PhiClassifier`].
//!
//! # Example
//!
//! ```no_run
//! use phi_boundary::boundary::{Deidentifier, DeidentifyOptions, Firewall, PhiClassifier};
//! use phi_boundary::domain::LocalClinicalRecord;
//!
//! let classifier = PhiClassifier::new()?;
//! let deidentifier = Deidentifier::new(classifier.clone(), "phi-boundary/1.0.0");
//! let firewall = Firewall::new(classifier);
//!
//! let packet = deidentifier.deidentify(
//!     "fac-1",
//!     &LocalClinicalRecord::default(),
//!     &DeidentifyOptions::default(),
//! );
//! firewall.assert_packet(&packet)?;
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod audit;
pub mod classifier;
pub mod codes;
pub mod config;
pub mod dates;
pub mod deidentifier;
pub mod firewall;
pub mod models;
pub mod patterns;
pub mod reinserter;

pub use audit::BoundaryAuditLogger;
pub use classifier::{PhiClassifier, REDACTION_TOKEN};
pub use config::{AuditConfig, BoundaryConfig};
pub use deidentifier::{Deidentifier, DeidentifyOptions};
pub use firewall::{Firewall, DEFAULT_SKIP_KEYS, FORBIDDEN_KEYS};
pub use models::PhiCategory;
pub use patterns::{PatternRegistry, DEFAULT_PATTERN_LIBRARY};
pub use reinserter::{
    extract_unfilled_placeholders, has_placeholders, looks_like_document, reinsert_phi,
    validate_context, ContextValidation, FieldKey, PlaceholderKey, Reinserter, ReplacementMap,
};
