//! Generation service trait
//!
//! Abstracts the remote letter drafter so the coordinator can be driven by
//! an HTTP endpoint in production and an in-process stub in tests.

use crate::domain::{DeidentifiedPacket, Result, TemplateText};
use async_trait::async_trait;

/// Remote service that drafts a letter template from a de-identified packet
///
/// Implementations must run the outbound firewall on the exact payload they
/// transmit, and must not send anything when it fails.
#[async_trait]
pub trait GenerationService: Send + Sync {
    /// Draft a template for `packet`
    ///
    /// # Errors
    ///
    /// - [`BoundaryError::PhiDetected`](crate::domain::BoundaryError::PhiDetected)
    ///   when the payload fails the firewall; nothing was sent
    /// - [`BoundaryError::Generation`](crate::domain::BoundaryError::Generation)
    ///   for transport, status or body failures
    async fn generate(&self, packet: &DeidentifiedPacket) -> Result<TemplateText>;

    /// Short name used in logs
    fn name(&self) -> &str;
}
