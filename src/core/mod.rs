//! Core orchestration for phi-boundary.
//!
//! # Letter Workflow
//!
//! 1. **De-identify**: build a [`DeidentifiedPacket`](crate::domain::DeidentifiedPacket)
//!    from the cached record
//! 2. **Firewall**: reject the packet on any PHI-shaped key or value
//! 3. **Generate**: send the packet to the remote service, receive a template
//! 4. **Reinsert**: fill placeholders locally from the record
//! 5. **Review**: report unfilled placeholders and context gaps
//!
//! Every step is recorded in the boundary audit log.
//!
//! # Example
//!
//! ```rust,no_run
//! use phi_boundary::adapters::generation::HttpGenerationService;
//! use phi_boundary::boundary::{Firewall, PhiClassifier};
//! use phi_boundary::config::load_config;
//! use phi_boundary::core::generation::{LetterCoordinator, LetterRequest};
//! use phi_boundary::domain::LocalClinicalRecord;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("phi-boundary.toml")?;
//! let firewall = Firewall::new(config.boundary.classifier()?);
//! let service = HttpGenerationService::new(
//!     &config.generation,
//!     firewall,
//!     config.boundary.skip_keys.clone(),
//! )?;
//! let coordinator = LetterCoordinator::from_config(&config, Arc::new(service))?;
//!
//! let record = LocalClinicalRecord::default();
//! let outcome = coordinator
//!     .generate_letter(&record, &LetterRequest::from_config(&config))
//!     .await?;
//! println!("needs review: {}", outcome.needs_review());
//! # Ok(())
//! # }
//! ```

pub mod generation;
