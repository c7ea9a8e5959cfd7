//! Validate config command implementation

use super::{EXIT_CONFIG, EXIT_OK};
use crate::config::load_config;
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        // load_config validates as part of loading
        let config = match load_config(config_path) {
            Ok(c) => {
                println!("✅ Configuration file loaded and valid");
                c
            }
            Err(e) => {
                println!("❌ Failed to load configuration file");
                println!("   Error: {e}");
                return Ok(EXIT_CONFIG);
            }
        };

        let classifier = match config.boundary.classifier() {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Pattern library failed to compile");
                println!("   Error: {e:#}");
                return Ok(EXIT_CONFIG);
            }
        };
        println!("✅ Pattern library compiled");

        let library = config
            .boundary
            .pattern_library
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "built-in".to_string());

        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);
        println!("  Facility Id: {}", config.facility_id().unwrap_or("(not set)"));
        println!(
            "  Pattern Library: {library} ({} patterns)",
            classifier.registry().all_patterns().len()
        );
        println!("  Skip Keys: {}", config.boundary.skip_keys.join(", "));
        println!("  Generator Version: {}", config.boundary.generator_version);
        println!(
            "  Audit Log: {}",
            if config.boundary.audit.enabled {
                config.boundary.audit.log_path.display().to_string()
            } else {
                "disabled".to_string()
            }
        );
        println!(
            "  Generation Endpoint: {}",
            config
                .generation
                .endpoint
                .as_deref()
                .unwrap_or("(not set)")
        );
        println!(
            "  API Key: {}",
            if config.generation.api_key.is_some() {
                "set"
            } else {
                "not set"
            }
        );
        println!("  Timeout: {}s", config.generation.timeout_seconds);
        println!(
            "  File Logging: {}",
            if config.logging.local_enabled {
                format!("{} ({})", config.logging.local_path, config.logging.local_rotation)
            } else {
                "disabled".to_string()
            }
        );
        println!();
        Ok(EXIT_OK)
    }
}
