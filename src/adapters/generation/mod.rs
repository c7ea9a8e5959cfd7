//! Remote generation service integration
//!
//! The only network path that carries clinical content. Every
//! implementation firewalls its payload before sending.

pub mod http;
pub mod service;

pub use http::{HttpGenerationService, REQUEST_ID_HEADER};
pub use service::GenerationService;
