//! Deidentify command implementation
//!
//! Builds a packet from a local record file and prints it once the
//! firewall has cleared it.

use super::{
    load_config_or_default, read_json, write_output, EXIT_CONFIG, EXIT_OK, EXIT_PHI_DETECTED,
};
use crate::boundary::{Deidentifier, DeidentifyOptions, Firewall};
use crate::config::PhiBoundaryConfig;
use crate::domain::{BoundaryError, LocalClinicalRecord};
use clap::Args;
use std::path::PathBuf;

/// Packet overrides shared by `deidentify` and `generate`
#[derive(Args, Debug, Clone, Default)]
pub struct PacketOverrides {
    /// Facility id stamped into the packet (defaults to facility.id)
    #[arg(long)]
    pub facility_id: Option<String>,

    /// Normalized service key, overriding the request's service name
    #[arg(long)]
    pub service_key: Option<String>,

    /// Normalized payer key, overriding the coverage's payer
    #[arg(long)]
    pub payer_key: Option<String>,

    /// Requested units
    #[arg(long)]
    pub units: Option<u32>,
}

impl PacketOverrides {
    /// De-identifier options from the overrides
    pub fn options(&self) -> DeidentifyOptions {
        DeidentifyOptions {
            service_key: self.service_key.clone(),
            payer_key: self.payer_key.clone(),
            requested_units: self.units,
        }
    }

    /// Facility id from the flag, else from configuration
    pub fn facility_id(&self, config: &PhiBoundaryConfig) -> Option<String> {
        self.facility_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .or_else(|| config.facility_id())
            .map(str::to_string)
    }
}

/// Arguments for the deidentify command
#[derive(Args, Debug)]
pub struct DeidentifyArgs {
    /// Local clinical record (JSON)
    #[arg(short, long)]
    pub record: PathBuf,

    #[command(flatten)]
    pub overrides: PacketOverrides,

    /// Write the packet here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl DeidentifyArgs {
    /// Execute the deidentify command
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

        let classifier = config.boundary.classifier()?;
        let deidentifier =
            Deidentifier::new(classifier.clone(), config.boundary.generator_version.clone());
        let firewall = Firewall::new(classifier);
        let audit = config.boundary.audit.logger()?;

        let packet = deidentifier.deidentify(&facility_id, &record, &self.overrides.options());
        audit.log_packet_built(&packet)?;

        let skip = config.boundary.skip_key_refs();
        match firewall.assert_serializable(&packet, &skip) {
            Ok(()) => audit.log_firewall_passed(&packet)?,
            Err(BoundaryError::PhiDetected(err)) => {
                audit.log_firewall_blocked(Some(&packet.case_id), &err)?;
                eprintln!("❌ {err}");
                return Ok(EXIT_PHI_DETECTED);
            }
            Err(e) => return Err(e.into()),
        }

        tracing::info!(case_id = %packet.case_id, "Packet built and cleared");

        let json = serde_json::to_string_pretty(&packet)?;
        write_output(self.output.as_deref(), &json)?;
        Ok(EXIT_OK)
    }
}
