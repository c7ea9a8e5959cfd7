//! Audit logging module
//!
//! Records every boundary crossing (packet built, firewall verdict,
//! template received, reinsertion finished) without recording PHI.

pub mod logger;

pub use logger::{packet_digest, AuditEvent, BoundaryAuditLogger};
