//! Configuration schema types
//!
//! Maps `phi-boundary.toml` onto typed sections. Facility and provider
//! details are local PHI-adjacent metadata: they feed reinsertion only and
//! never reach the packet.

use crate::boundary::BoundaryConfig;
use crate::config::SecretString;
use crate::domain::{Facility, Provider};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PhiBoundaryConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Sending facility, used to fill facility placeholders
    #[serde(default)]
    pub facility: Option<Facility>,

    /// Default signing provider
    #[serde(default)]
    pub provider: Option<Provider>,

    /// De-identifier and firewall settings
    #[serde(default)]
    pub boundary: BoundaryConfig,

    /// Remote generation service
    #[serde(default)]
    pub generation: GenerationConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl PhiBoundaryConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns a description of the first invalid value
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.boundary.validate().map_err(|e| format!("{e:#}"))?;
        self.generation.validate()?;
        self.logging.validate()?;
        Ok(())
    }

    /// Facility id stamped into packets, if one is configured
    pub fn facility_id(&self) -> Option<&str> {
        self.facility
            .as_ref()
            .and_then(|f| f.id.as_deref())
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

/// Remote generation service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Endpoint that accepts a de-identified packet and returns a template
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Bearer token; zeroized on drop and never serialized
    #[serde(default, skip_serializing)]
    pub api_key: Option<SecretString>,

    /// Whole-request timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// Connect timeout in seconds
    #[serde(default = "default_connect_timeout_seconds")]
    pub connect_timeout_seconds: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            api_key: None,
            timeout_seconds: default_timeout_seconds(),
            connect_timeout_seconds: default_connect_timeout_seconds(),
        }
    }
}

impl GenerationConfig {
    fn validate(&self) -> Result<(), String> {
        if let Some(ref endpoint) = self.endpoint {
            let url = url::Url::parse(endpoint)
                .map_err(|e| format!("Invalid generation.endpoint '{endpoint}': {e}"))?;
            if !matches!(url.scheme(), "http" | "https") {
                return Err(format!(
                    "generation.endpoint must use http or https, got '{}'",
                    url.scheme()
                ));
            }
        }

        if self.timeout_seconds == 0 {
            return Err("generation.timeout_seconds must be > 0".to_string());
        }
        if self.connect_timeout_seconds == 0 {
            return Err("generation.connect_timeout_seconds must be > 0".to_string());
        }
        Ok(())
    }

    /// Request timeout as a `Duration`
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Connect timeout as a `Duration`
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_seconds)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable local file logging
    #[serde(default = "default_true")]
    pub local_enabled: bool,

    /// Local log directory
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation (daily, hourly, never)
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }

        if self.local_enabled && self.local_path.trim().is_empty() {
            return Err("logging.local_path cannot be empty when local logging is enabled".to_string());
        }

        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: true,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_timeout_seconds() -> u64 {
    60
}

fn default_connect_timeout_seconds() -> u64 {
    10
}

fn default_local_path() -> String {
    "./logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}
