//! External system integrations.
//!
//! - [`generation`] - Remote letter generation service
//!
//! # Design Pattern
//!
//! Adapters isolate external dependencies behind traits so the coordinator
//! can be tested with in-process stubs. The generation adapter is the only
//! component that opens a network connection, and it firewalls the exact
//! payload it sends.
//!
//! ```rust,no_run
//! use phi_boundary::adapters::generation::HttpGenerationService;
//! use phi_boundary::boundary::{Firewall, PhiClassifier};
//! use phi_boundary::config::{secret_string, GenerationConfig};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = GenerationConfig {
//!     endpoint: Some("https://letters.example.com/v1/generate".to_string()),
//!     api_key: Some(secret_string("sk-live".to_string())),
//!     ..Default::default()
//! };
//! let service = HttpGenerationService::new(
//!     &config,
//!     Firewall::new(PhiClassifier::new()?),
//!     vec!["facility_id".to_string(), "audit".to_string()],
//! )?;
//! # Ok(())
//! # }
//! ```

pub mod generation;
