//! Domain error types
//!
//! This module defines the error hierarchy for the PHI boundary.
//! All errors are domain-specific and don't expose third-party types.

use std::fmt;
use thiserror::Error;

/// Main boundary error type
///
/// This is the primary error type used throughout the application.
/// It wraps specific error types and provides context for error handling.
#[derive(Debug, Error)]
pub enum BoundaryError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The outbound firewall found PHI in a payload
    #[error(transparent)]
    PhiDetected(#[from] PhiDetectedError),

    /// Remote generation service errors
    #[error("Generation error: {0}")]
    Generation(#[from] GenerationError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

impl BoundaryError {
    /// Whether this error came from the outbound firewall
    pub fn is_phi_detected(&self) -> bool {
        matches!(self, Self::PhiDetected(_))
    }

    /// Non-technical message suitable for clinic staff
    pub fn user_message(&self) -> String {
        match self {
            Self::PhiDetected(_) => "Letter generation was stopped because the outgoing request \
                 still contained patient-identifying information. Nothing was sent."
                .to_string(),
            Self::Generation(GenerationError::Timeout(_)) => {
                "The letter service did not respond in time. Please try again.".to_string()
            }
            Self::Generation(_) => {
                "The letter service could not produce a draft. Please try again later.".to_string()
            }
            Self::Configuration(_) => {
                "The application is not configured correctly. Contact your administrator."
                    .to_string()
            }
            other => format!("Letter generation failed: {other}"),
        }
    }
}

/// Which firewall rule rejected the payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViolationKind {
    /// The key name itself is a PHI field
    BlockedKey,
    /// A string value matched a PHI label or pattern
    BlockedText,
    /// `patient_ref` carries a stable, linkable identifier
    BlockedPatientRef,
}

impl ViolationKind {
    /// Label used in the error message
    pub fn label(&self) -> &'static str {
        match self {
            Self::BlockedKey => "blocked key",
            Self::BlockedText => "blocked text",
            Self::BlockedPatientRef => "blocked patient_ref",
        }
    }
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Raised by the firewall on the first PHI hit in an outbound payload.
///
/// Only the key path is carried, never the offending value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("ERROR: PHI detected. Non-PHI packet required. ({kind}: {path})")]
pub struct PhiDetectedError {
    /// Rule that fired
    pub kind: ViolationKind,
    /// Dotted path to the offending key or value
    pub path: String,
}

impl PhiDetectedError {
    /// Creates a new PHI detection error
    pub fn new(kind: ViolationKind, path: impl Into<String>) -> Self {
        Self {
            kind,
            path: path.into(),
        }
    }
}

/// Remote generation service errors
///
/// These errors don't expose third-party HTTP client types.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// Failed to reach the generation service
    #[error("Failed to connect to generation service: {0}")]
    ConnectionFailed(String),

    /// Request timed out
    #[error("Request timeout: {0}")]
    Timeout(String),

    /// Server error (5xx)
    #[error("Server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    /// Client error (4xx)
    #[error("Client error: {status} - {message}")]
    ClientError { status: u16, message: String },

    /// Response body could not be interpreted
    #[error("Invalid response from generation service: {0}")]
    InvalidResponse(String),

    /// Service answered with no template text
    #[error("Generation service returned an empty template")]
    EmptyTemplate,
}

// Conversion from std::io::Error
impl From<std::io::Error> for BoundaryError {
    fn from(err: std::io::Error) -> Self {
        BoundaryError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for BoundaryError {
    fn from(err: serde_json::Error) -> Self {
        BoundaryError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for BoundaryError {
    fn from(err: toml::de::Error) -> Self {
        BoundaryError::Configuration(format!("TOML parse error: {err}"))
    }
}
