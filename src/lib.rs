// phi-boundary - PHI boundary for prior-authorization letter generation
// Copyright (c) 2025 Phi Boundary Contributors
// Licensed under the MIT License

//! # phi-boundary
//!
//! Drafts prior-authorization and appeal letters with a remote generation
//! service while keeping protected health information (PHI) on the device.
//!
//! ## Overview
//!
//! - **De-identify** a cached clinical record into a packet of age bands,
//!   normalized keys, codes and sanitized summaries
//! - **Firewall** every outbound payload and abort on the first PHI-shaped
//!   key or value
//! - **Reinsert** real names, dates and identifiers into the returned
//!   template, locally
//!
//! ## Architecture
//!
//! - [`domain`] - Records, packet, reinsertion context, errors
//! - [`boundary`] - De-identifier, firewall, reinserter, pattern library, audit
//! - [`adapters`] - Remote generation service
//! - [`core`] - Letter coordinator
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//! - [`cli`] - Command-line interface
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use phi_boundary::boundary::{
//!     Deidentifier, DeidentifyOptions, Firewall, PhiClassifier, Reinserter,
//! };
//! use phi_boundary::domain::{LocalClinicalRecord, PhiReinsertionContext};
//!
//! # fn example(record: LocalClinicalRecord) -> Result<(), Box<dyn std::error::Error>> {
//! let classifier = PhiClassifier::new()?;
//! let deidentifier = Deidentifier::new(classifier.clone(), "phi-boundary/1.0.0");
//! let firewall = Firewall::new(classifier);
//!
//! let packet = deidentifier.deidentify("fac-001", &record, &DeidentifyOptions::default());
//! firewall.assert_packet(&packet)?;
//!
//! // ... send the packet, receive a template ...
//! let template = "Dear {{payer_name}}, re: {{patient_full_name}}";
//!
//! let ctx = PhiReinsertionContext::from_record(&record, None, None);
//! let letter = Reinserter::new().reinsert(template, &ctx);
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Fallible library calls return [`domain::Result`], whose error is
//! [`domain::BoundaryError`]. A firewall rejection is always
//! [`domain::BoundaryError::PhiDetected`]:
//!
//! ```rust,no_run
//! use phi_boundary::domain::BoundaryError;
//!
//! fn report(err: &BoundaryError) {
//!     if err.is_phi_detected() {
//!         eprintln!("{}", err.user_message());
//!     }
//! }
//! ```

pub mod adapters;
pub mod boundary;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
