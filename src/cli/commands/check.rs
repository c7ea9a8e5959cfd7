//! Check command implementation
//!
//! Runs the outbound firewall over an arbitrary JSON payload.

use super::{load_config_or_default, read_json, EXIT_CONFIG, EXIT_OK, EXIT_PHI_DETECTED};
use crate::boundary::firewall::validate_skip_keys;
use crate::boundary::Firewall;
use clap::Args;
use serde_json::Value;
use std::path::PathBuf;

/// Arguments for the check command
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// JSON payload to check
    #[arg(short, long)]
    pub payload: PathBuf,

    /// Root key to exempt (repeatable; defaults to boundary.skip_keys)
    #[arg(long = "skip-key")]
    pub skip_keys: Vec<String>,
}

impl CheckArgs {
    /// Execute the check command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let config = match load_config_or_default(config_path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("❌ {e}");
                return Ok(EXIT_CONFIG);
            }
        };

        if let Err(e) = validate_skip_keys(&self.skip_keys) {
            eprintln!("❌ {e}");
            return Ok(EXIT_CONFIG);
        }

        let payload: Value = read_json(&self.payload)?;
        let firewall = Firewall::new(config.boundary.classifier()?);

        let skip: Vec<&str> = if self.skip_keys.is_empty() {
            config.boundary.skip_key_refs()
        } else {
            self.skip_keys.iter().map(String::as_str).collect()
        };

        match firewall.assert_no_phi(&payload, &skip) {
            Ok(()) => {
                println!("✅ No PHI detected: {}", self.payload.display());
                Ok(EXIT_OK)
            }
            Err(err) => {
                println!("❌ {err}");
                Ok(EXIT_PHI_DETECTED)
            }
        }
    }
}
