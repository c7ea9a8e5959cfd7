//! CLI command implementations
//!
//! Every command returns a process exit code:
//!
//! | Code | Meaning |
//! |------|---------|
//! | 0 | Success |
//! | 1 | Completed, but the output needs review |
//! | 2 | Configuration or input error |
//! | 3 | PHI detected; nothing was sent or written |
//! | 5 | Fatal error |

pub mod check;
pub mod deidentify;
pub mod generate;
pub mod init;
pub mod reinsert;
pub mod validate;

use crate::config::{default_config, load_config, PhiBoundaryConfig};
use crate::domain::BoundaryError;
use anyhow::Context;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;

pub const EXIT_OK: i32 = 0;
pub const EXIT_REVIEW: i32 = 1;
pub const EXIT_CONFIG: i32 = 2;
pub const EXIT_PHI_DETECTED: i32 = 3;
pub const EXIT_FATAL: i32 = 5;

/// Exit code for a boundary error
pub fn exit_code_for(error: &BoundaryError) -> i32 {
    match error {
        BoundaryError::PhiDetected(_) => EXIT_PHI_DETECTED,
        BoundaryError::Configuration(_) | BoundaryError::Validation(_) => EXIT_CONFIG,
        _ => EXIT_FATAL,
    }
}

/// Load the config file, or defaults plus environment when it is absent
pub(crate) fn load_config_or_default(config_path: &str) -> crate::domain::Result<PhiBoundaryConfig> {
    if Path::new(config_path).exists() {
        load_config(config_path)
    } else {
        tracing::debug!(config_path = %config_path, "Config file not found, using defaults");
        default_config()
    }
}

/// Read and parse a JSON input file
pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Invalid JSON in {}", path.display()))
}

/// Write to `output`, or stdout when no path is given
pub(crate) fn write_output(output: Option<&Path>, content: &str) -> anyhow::Result<()> {
    match output {
        Some(path) => fs::write(path, content)
            .with_context(|| format!("Failed to write {}", path.display())),
        None => {
            println!("{content}");
            Ok(())
        }
    }
}
