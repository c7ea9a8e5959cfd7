//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::PhiBoundaryConfig;
use super::secret::secret_string_opt;
use crate::domain::errors::BoundaryError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

static ENV_REF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").expect("env reference regex is valid")
});

/// Loads configuration from a TOML file
///
/// 1. Reads the file
/// 2. Substitutes `${VAR}` references from the environment
/// 3. Parses the TOML into [`PhiBoundaryConfig`]
/// 4. Applies `PHI_BOUNDARY_*` overrides
/// 5. Validates the result
///
/// # Errors
///
/// Returns [`BoundaryError::Configuration`] for a missing or unreadable file,
/// an unset referenced variable, bad TOML, or a failed validation.
///
/// # Examples
///
/// ```no_run
/// use phi_boundary::config::load_config;
///
/// let config = load_config("phi-boundary.toml")?;
/// println!("log level: {}", config.application.log_level);
/// # Ok::<(), phi_boundary::domain::BoundaryError>(())
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<PhiBoundaryConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(BoundaryError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        BoundaryError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let contents = substitute_env_vars(&contents)?;

    let mut config: PhiBoundaryConfig = toml::from_str(&contents)
        .map_err(|e| BoundaryError::Configuration(format!("Failed to parse TOML: {e}")))?;

    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        BoundaryError::Configuration(format!("Configuration validation failed: {e}"))
    })?;

    Ok(config)
}

/// Defaults plus environment overrides, for running without a file
pub fn default_config() -> Result<PhiBoundaryConfig> {
    let mut config = PhiBoundaryConfig::default();
    apply_env_overrides(&mut config)?;
    config.validate().map_err(|e| {
        BoundaryError::Configuration(format!("Configuration validation failed: {e}"))
    })?;
    Ok(config)
}

/// Substitutes `${VAR_NAME}` references; comment lines are left alone
///
/// # Errors
///
/// Lists every referenced variable that is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let mut result = String::with_capacity(input.len());
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let processed = ENV_REF.replace_all(line, |caps: &regex::Captures| {
            let var_name = &caps[1];
            match std::env::var(var_name) {
                Ok(value) => value,
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                    caps[0].to_string()
                }
            }
        });
        result.push_str(&processed);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(BoundaryError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

/// Applies `PHI_BOUNDARY_<SECTION>_<KEY>` overrides
///
/// Boundary and audit overrides are owned by
/// [`BoundaryConfig::apply_env_overrides`](crate::boundary::BoundaryConfig::apply_env_overrides).
fn apply_env_overrides(config: &mut PhiBoundaryConfig) -> Result<()> {
    // Application overrides
    if let Ok(val) = std::env::var("PHI_BOUNDARY_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }

    // Facility overrides
    if let Ok(val) = std::env::var("PHI_BOUNDARY_FACILITY_ID") {
        config.facility.get_or_insert_with(Default::default).id = Some(val);
    }

    // Generation overrides
    if let Ok(val) = std::env::var("PHI_BOUNDARY_GENERATION_ENDPOINT") {
        config.generation.endpoint = Some(val);
    }
    if let Ok(val) = std::env::var("PHI_BOUNDARY_GENERATION_API_KEY") {
        config.generation.api_key = secret_string_opt(Some(val));
    }
    if let Ok(val) = std::env::var("PHI_BOUNDARY_GENERATION_TIMEOUT_SECONDS") {
        config.generation.timeout_seconds = val.parse().map_err(|_| {
            BoundaryError::Configuration(format!(
                "Invalid PHI_BOUNDARY_GENERATION_TIMEOUT_SECONDS value: {val}"
            ))
        })?;
    }

    // Logging overrides
    if let Ok(val) = std::env::var("PHI_BOUNDARY_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = val.parse().unwrap_or(true);
    }
    if let Ok(val) = std::env::var("PHI_BOUNDARY_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }

    config
        .boundary
        .apply_env_overrides()
        .map_err(|e| BoundaryError::Configuration(format!("{e:#}")))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_substitute_env_vars() {
        std::env::set_var("PHI_TEST_ENDPOINT_HOST", "letters.example.com");
        let input = "endpoint = \"https://${PHI_TEST_ENDPOINT_HOST}/v1\"";
        let result = substitute_env_vars(input).unwrap();
        assert_eq!(result, "endpoint = \"https://letters.example.com/v1\"\n");
        std::env::remove_var("PHI_TEST_ENDPOINT_HOST");
    }

    #[test]
    fn test_substitute_env_vars_missing() {
        std::env::remove_var("PHI_TEST_MISSING_VAR");
        let input = "api_key = \"${PHI_TEST_MISSING_VAR}\"";
        let err = substitute_env_vars(input).unwrap_err();
        assert!(err.to_string().contains("PHI_TEST_MISSING_VAR"));
    }

    #[test]
    fn test_substitute_skips_comments() {
        std::env::remove_var("PHI_TEST_COMMENTED_VAR");
        let input = "# api_key = \"${PHI_TEST_COMMENTED_VAR}\"";
        assert!(substitute_env_vars(input).is_ok());
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config("nonexistent-phi-boundary.toml");
        assert!(matches!(result, Err(BoundaryError::Configuration(_))));
    }

    #[test]
    fn test_load_config_valid() {
        let toml_content = r#"
[application]
log_level = "warn"

[facility]
id = "fac-loader"
name = "Loader Clinic"

[generation]
endpoint = "https://letters.example.com/v1/generate"
timeout_seconds = 15
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.facility_id(), Some("fac-loader"));
        assert_eq!(config.generation.timeout_seconds, 15);
    }

    #[test]
    fn test_load_config_invalid_value() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[logging]\nlocal_rotation = \"weekly\"\n")
            .unwrap();
        temp_file.flush().unwrap();

        let err = load_config(temp_file.path()).unwrap_err();
        assert!(err.to_string().contains("validation failed"));
    }
}
