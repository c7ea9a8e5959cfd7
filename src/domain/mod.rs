//! Domain models and types for the PHI boundary.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Local records** ([`LocalClinicalRecord`]) fetched from the clinic backend
//! - **The outbound packet** ([`DeidentifiedPacket`]), the only clinical payload
//!   allowed off the device
//! - **The reinsertion context** ([`PhiReinsertionContext`]), its local mirror
//! - **Ephemeral identifiers** ([`CaseId`], [`PatientRef`])
//! - **Error types** ([`BoundaryError`], [`PhiDetectedError`], [`GenerationError`])
//!
//! # Error Handling
//!
//! Fallible operations return [`Result<T, BoundaryError>`]:
//!
//! ```rust
//! use phi_boundary::domain::{BoundaryError, Result};
//!
//! fn example() -> Result<()> {
//!     Err(BoundaryError::Validation("missing patient".to_string()))
//! }
//! ```

pub mod context;
pub mod errors;
pub mod ids;
pub mod packet;
pub mod record;
pub mod result;

// Re-export commonly used types for convenience
pub use context::{Facility, PhiReinsertionContext, Provider};
pub use errors::{BoundaryError, GenerationError, PhiDetectedError, ViolationKind};
pub use ids::{CaseId, PatientRef};
pub use packet::{
    ConservativeTreatment, DeidentifiedPacket, OtherTherapy, PacketAudit, PacketClinical,
    PacketCoverage, PacketImaging, PacketPatient, PacketRequest, TemplateText,
};
pub use record::{
    Address, AuthRequest, Coverage, Encounter, ImagingStudy, LocalClinicalRecord, MedTrial,
    ParentLetter, Patient, Problem, Therapy,
};
pub use result::Result;
