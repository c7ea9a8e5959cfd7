//! Configuration management for phi-boundary.
//!
//! TOML configuration with:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `PHI_BOUNDARY_*` overrides applied after parsing
//! - Defaults for every section, so an empty file is valid
//! - Validation on load
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use phi_boundary::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("phi-boundary.toml")?;
//! println!("Endpoint: {:?}", config.generation.endpoint);
//! # Ok(())
//! # }
//! ```
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! log_level = "info"
//!
//! [facility]
//! id = "fac-001"
//! name = "Riverside Orthopedics"
//!
//! [boundary]
//! skip_keys = ["facility_id", "audit"]
//!
//! [boundary.audit]
//! log_path = "./audit/boundary.log"
//!
//! [generation]
//! endpoint = "https://letters.example.com/v1/generate"
//! api_key = "${PHI_BOUNDARY_API_KEY}"
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

pub use loader::{default_config, load_config};
pub use schema::{ApplicationConfig, GenerationConfig, LoggingConfig, PhiBoundaryConfig};
pub use secret::{secret_string, secret_string_opt, SecretString, SecretValue};
