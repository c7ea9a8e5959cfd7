//! Init command implementation
//!
//! Writes a starter configuration file and, optionally, a copy of the
//! built-in pattern library for local tuning.

use super::{EXIT_CONFIG, EXIT_FATAL, EXIT_OK};
use crate::boundary::DEFAULT_PATTERN_LIBRARY;
use clap::Args;
use std::fs;
use std::path::{Path, PathBuf};

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "phi-boundary.toml")]
    pub output: String,

    /// Also write the built-in pattern library to this path
    #[arg(long)]
    pub patterns: Option<PathBuf>,

    /// Overwrite existing files
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("📝 Initializing phi-boundary configuration");
        println!();

        let targets = std::iter::once(Path::new(&self.output)).chain(self.patterns.as_deref());
        for target in targets {
            if target.exists() && !self.force {
                println!("❌ File already exists: {}", target.display());
                println!("   Use --force to overwrite");
                return Ok(EXIT_CONFIG);
            }
        }

        if let Err(e) = fs::write(&self.output, Self::generate_config(self.patterns.as_deref())) {
            println!("❌ Failed to write configuration file");
            println!("   Error: {e}");
            return Ok(EXIT_FATAL);
        }
        println!("✅ Configuration file created: {}", self.output);

        if let Some(ref patterns) = self.patterns {
            if let Err(e) = fs::write(patterns, DEFAULT_PATTERN_LIBRARY) {
                println!("❌ Failed to write pattern library");
                println!("   Error: {e}");
                return Ok(EXIT_FATAL);
            }
            println!("✅ Pattern library created: {}", patterns.display());
        }

        println!();
        println!("Next steps:");
        println!("  1. Edit {} with your facility and provider details", self.output);
        println!("  2. Set PHI_BOUNDARY_API_KEY in your environment or .env file");
        println!("  3. Validate configuration: phi-boundary validate-config");
        println!("  4. Check a packet: phi-boundary deidentify --record record.json");
        println!();
        Ok(EXIT_OK)
    }

    /// Starter configuration
    fn generate_config(patterns: Option<&Path>) -> String {
        let pattern_line = match patterns {
            Some(path) => format!("pattern_library = \"{}\"", path.display()),
            None => "# pattern_library = \"./phi_patterns.toml\"".to_string(),
        };

        format!(
            r#"# phi-boundary configuration
#
# Values of the form ${{VAR}} are read from the environment (or .env).
# Facility and provider details stay on this machine: they are used only to
# fill placeholders in the returned letter and are never sent.

[application]
# Log level (trace, debug, info, warn, error)
log_level = "info"

[facility]
# Facility id sent with every packet (must not identify a patient)
id = "fac-001"
name = "Example Clinic"
npi = "1234567890"
phone = "5555550100"
fax = "5555550101"

[facility.address]
line1 = "100 Main St"
city = "Springfield"
state = "IL"
zip = "62701"

[provider]
first_name = "Alex"
last_name = "Morgan"
credentials = "MD"
npi = "1098765432"
specialty = "Orthopedics"

[boundary]
# Built-in patterns are used when no library is given
{pattern_line}
# Root keys the firewall exempts
skip_keys = ["facility_id", "audit"]

[boundary.audit]
enabled = true
log_path = "./audit/boundary.log"
json_format = true

[generation]
endpoint = "https://letters.example.com/v1/generate"
api_key = "${{PHI_BOUNDARY_API_KEY}}"
timeout_seconds = 60
connect_timeout_seconds = 10

[logging]
local_enabled = true
local_path = "./logs"
# daily | hourly | never
local_rotation = "daily"
"#
        )
    }
}
