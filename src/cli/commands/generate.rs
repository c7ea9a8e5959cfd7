//! Generate command implementation
//!
//! Runs the whole pipeline against the configured generation endpoint.

use super::deidentify::PacketOverrides;
use super::{
    exit_code_for, load_config_or_default, read_json, write_output, EXIT_CONFIG, EXIT_OK,
    EXIT_REVIEW,
};
use crate::adapters::generation::HttpGenerationService;
use crate::boundary::Firewall;
use crate::core::generation::{LetterCoordinator, LetterRequest};
use crate::domain::{BoundaryError, LocalClinicalRecord};
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;

/// Arguments for the generate command
#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Local clinical record (JSON)
    #[arg(short, long)]
    pub record: PathBuf,

    #[command(flatten)]
    pub overrides: PacketOverrides,

    /// Write the letter here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl GenerateArgs {
    /// Execute the generate command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let config = match load_config_or_default(config_path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("❌ {e}");
                return Ok(EXIT_CONFIG);
            }
        };

        let Some(facility_id) = self.overrides.facility_id(&config) else {
            eprintln!("❌ No facility id: pass --facility-id or set facility.id");
            return Ok(EXIT_CONFIG);
        };

        let record: LocalClinicalRecord = read_json(&self.record)?;

        let coordinator = match self.build_coordinator(&config) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("❌ {e}");
                return Ok(exit_code_for(&e));
            }
        };

        let request = LetterRequest {
            facility_id,
            options: self.overrides.options(),
            ..LetterRequest::from_config(&config)
        };

        match coordinator.generate_letter(&record, &request).await {
            Ok(outcome) => {
                write_output(self.output.as_deref(), &outcome.document)?;
                for note in outcome.review_notes() {
                    eprintln!("⚠️  {note}");
                }
                Ok(if outcome.needs_review() {
                    EXIT_REVIEW
                } else {
                    EXIT_OK
                })
            }
            Err(e) => {
                crate::log_error_with_context!(&e, "Letter generation failed");
                eprintln!("❌ {}", e.user_message());
                Ok(exit_code_for(&e))
            }
        }
    }

    fn build_coordinator(
        &self,
        config: &crate::config::PhiBoundaryConfig,
    ) -> Result<LetterCoordinator, BoundaryError> {
        let classifier = config
            .boundary
            .classifier()
            .map_err(|e| BoundaryError::Configuration(format!("{e:#}")))?;
        let service = HttpGenerationService::new(
            &config.generation,
            Firewall::new(classifier),
            config.boundary.skip_keys.clone(),
        )?;
        LetterCoordinator::from_config(config, Arc::new(service))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_endpoint_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let record_path = dir.path().join("record.json");
        std::fs::write(&record_path, "{}").unwrap();

        let args = GenerateArgs {
            record: record_path,
            overrides: PacketOverrides {
                facility_id: Some("fac-1".to_string()),
                ..Default::default()
            },
            output: None,
        };
        let code = args
            .execute(dir.path().join("absent.toml").to_str().unwrap())
            .await
            .unwrap();
        assert_eq!(code, EXIT_CONFIG);
    }

    #[tokio::test]
    async fn test_end_to_end_against_mock_server() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/generate")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"template":"Dear {{payer_name}},\nRe: {{patient_full_name}}\nSincerely,\nClinic"}"#)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("phi-boundary.toml");
        let record_path = dir.path().join("record.json");
        let output_path = dir.path().join("letter.txt");
        std::fs::write(
            &config_path,
            format!(
                "[facility]\nid = \"fac-1\"\n\n[boundary.audit]\nenabled = false\n\n[generation]\nendpoint = \"{}/v1/generate\"\n",
                server.url()
            ),
        )
        .unwrap();
        std::fs::write(
            &record_path,
            r#"{"patient":{"id":"p-1","full_name":"Jane Doe"},"coverage":{"payer_name":"Aetna"}}"#,
        )
        .unwrap();

        let args = GenerateArgs {
            record: record_path,
            overrides: PacketOverrides::default(),
            output: Some(output_path.clone()),
        };
        let code = args.execute(config_path.to_str().unwrap()).await.unwrap();

        mock.assert_async().await;
        assert_eq!(code, EXIT_OK);
        assert_eq!(
            std::fs::read_to_string(&output_path).unwrap(),
            "Dear Aetna,\nRe: Jane Doe\nSincerely,\nClinic"
        );
    }
}
