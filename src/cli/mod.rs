//! CLI interface and argument parsing

pub mod commands;

use clap::{Parser, Subcommand};

/// phi-boundary - keep patient data on the device while drafting letters
#[derive(Parser, Debug)]
#[command(name = "phi-boundary")]
#[command(version, about, long_about = None)]
#[command(author = "Phi Boundary Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "phi-boundary.toml", env = "PHI_BOUNDARY_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "PHI_BOUNDARY_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build a de-identified packet from a local record
    Deidentify(commands::deidentify::DeidentifyArgs),

    /// Run the outbound firewall over a JSON payload
    Check(commands::check::CheckArgs),

    /// Fill a template's placeholders from a local record
    Reinsert(commands::reinsert::ReinsertArgs),

    /// De-identify, generate remotely and reinsert in one run
    Generate(commands::generate::GenerateArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}
