//! Boundary configuration

use super::audit::BoundaryAuditLogger;
use super::classifier::PhiClassifier;
use super::firewall::{validate_skip_keys, DEFAULT_SKIP_KEYS};
use super::patterns::PatternRegistry;
use crate::domain::packet::DEFAULT_GENERATOR_VERSION;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// `[boundary]` section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoundaryConfig {
    /// Path to a pattern library TOML file; the built-in library when unset
    pub pattern_library: Option<PathBuf>,

    /// Root keys the firewall exempts
    #[serde(default = "default_skip_keys")]
    pub skip_keys: Vec<String>,

    /// Version string stamped into every packet
    #[serde(default = "default_generator_version")]
    pub generator_version: String,

    /// Audit logging configuration
    #[serde(default)]
    pub audit: AuditConfig,
}

fn default_skip_keys() -> Vec<String> {
    DEFAULT_SKIP_KEYS.iter().map(|k| k.to_string()).collect()
}

fn default_generator_version() -> String {
    DEFAULT_GENERATOR_VERSION.to_string()
}

impl Default for BoundaryConfig {
    fn default() -> Self {
        Self {
            pattern_library: None,
            skip_keys: default_skip_keys(),
            generator_version: default_generator_version(),
            audit: AuditConfig::default(),
        }
    }
}

impl BoundaryConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if let Some(ref path) = self.pattern_library {
            if !path.exists() {
                anyhow::bail!("Pattern library file not found: {}", path.display());
            }
            if path.extension().and_then(|s| s.to_str()) != Some("toml") {
                anyhow::bail!("Pattern library must be a TOML file: {}", path.display());
            }
        }

        if self.generator_version.trim().is_empty() {
            anyhow::bail!("boundary.generator_version cannot be empty");
        }

        validate_skip_keys(&self.skip_keys).context("Invalid boundary.skip_keys")?;

        self.audit.validate().context("Invalid audit configuration")?;

        Ok(())
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(val) = std::env::var("PHI_BOUNDARY_PATTERN_LIBRARY") {
            self.pattern_library = Some(PathBuf::from(val));
        }

        if let Ok(val) = std::env::var("PHI_BOUNDARY_SKIP_KEYS") {
            self.skip_keys = val
                .split(',')
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .map(str::to_string)
                .collect();
        }

        if let Ok(val) = std::env::var("PHI_BOUNDARY_GENERATOR_VERSION") {
            self.generator_version = val;
        }

        self.audit.apply_env_overrides()?;

        Ok(())
    }

    /// Classifier over the configured pattern library
    pub fn classifier(&self) -> Result<PhiClassifier> {
        match &self.pattern_library {
            Some(path) => Ok(PhiClassifier::with_registry(PatternRegistry::from_file(path)?)),
            None => PhiClassifier::new(),
        }
    }

    /// Skip keys as string slices
    pub fn skip_key_refs(&self) -> Vec<&str> {
        self.skip_keys.iter().map(String::as_str).collect()
    }
}

/// `[boundary.audit]` section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Enable audit logging
    #[serde(default = "default_audit_enabled")]
    pub enabled: bool,

    /// Audit log file path
    #[serde(default = "default_audit_log_path")]
    pub log_path: PathBuf,

    /// Use JSON format for audit logs
    #[serde(default = "default_audit_json_format")]
    pub json_format: bool,
}

fn default_audit_enabled() -> bool {
    true
}

fn default_audit_log_path() -> PathBuf {
    PathBuf::from("./audit/boundary.log")
}

fn default_audit_json_format() -> bool {
    true
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: default_audit_enabled(),
            log_path: default_audit_log_path(),
            json_format: default_audit_json_format(),
        }
    }
}

impl AuditConfig {
    /// Validate audit configuration
    pub fn validate(&self) -> Result<()> {
        if self.enabled && self.log_path.as_os_str().is_empty() {
            anyhow::bail!("boundary.audit.log_path cannot be empty when audit is enabled");
        }
        Ok(())
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(val) = std::env::var("PHI_BOUNDARY_AUDIT_ENABLED") {
            self.enabled = val
                .parse()
                .context("Invalid PHI_BOUNDARY_AUDIT_ENABLED value")?;
        }

        if let Ok(val) = std::env::var("PHI_BOUNDARY_AUDIT_LOG_PATH") {
            self.log_path = PathBuf::from(val);
        }

        if let Ok(val) = std::env::var("PHI_BOUNDARY_AUDIT_JSON_FORMAT") {
            self.json_format = val
                .parse()
                .context("Invalid PHI_BOUNDARY_AUDIT_JSON_FORMAT value")?;
        }

        Ok(())
    }

    /// Logger for this configuration
    pub fn logger(&self) -> Result<BoundaryAuditLogger> {
        BoundaryAuditLogger::new(self.log_path.clone(), self.json_format, self.enabled)
    }
}
