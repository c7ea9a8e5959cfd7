//! Reinsert command implementation
//!
//! Fills a saved template from a local record. Nothing leaves the device.

use super::{
    load_config_or_default, read_json, write_output, EXIT_CONFIG, EXIT_OK, EXIT_REVIEW,
};
use crate::boundary::{extract_unfilled_placeholders, looks_like_document, validate_context, Reinserter};
use crate::domain::{LocalClinicalRecord, PhiReinsertionContext};
use anyhow::Context;
use chrono::NaiveDate;
use clap::Args;
use std::path::PathBuf;

/// Arguments for the reinsert command
#[derive(Args, Debug)]
pub struct ReinsertArgs {
    /// Template text returned by the generation service
    #[arg(short, long)]
    pub template: PathBuf,

    /// Local clinical record (JSON)
    #[arg(short, long)]
    pub record: PathBuf,

    /// Date used for current-date placeholders (YYYY-MM-DD, default today)
    #[arg(long)]
    pub date: Option<NaiveDate>,

    /// Write the letter here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl ReinsertArgs {
    /// Execute the reinsert command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let config = match load_config_or_default(config_path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("❌ {e}");
                return Ok(EXIT_CONFIG);
            }
        };

        let template = std::fs::read_to_string(&self.template)
            .with_context(|| format!("Failed to read {}", self.template.display()))?;
        let record: LocalClinicalRecord = read_json(&self.record)?;

        let ctx = PhiReinsertionContext::from_record(
            &record,
            config.facility.clone(),
            config.provider.clone(),
        );
        let validation = validate_context(&ctx);

        let reinserter = match self.date {
            Some(date) => Reinserter::with_today(date),
            None => Reinserter::new(),
        };

        let mut needs_review = false;
        let document = if looks_like_document(&template) {
            reinserter.reinsert(&template, &ctx)
        } else {
            eprintln!("⚠️  Template does not look like a letter; left unchanged");
            needs_review = true;
            template
        };

        if !validation.is_valid() {
            eprintln!("⚠️  Missing context fields: {}", validation.missing.join(", "));
            needs_review = true;
        }

        let unfilled = extract_unfilled_placeholders(&document);
        if !unfilled.is_empty() {
            let names: Vec<String> = unfilled.iter().map(ToString::to_string).collect();
            eprintln!("⚠️  Unfilled placeholders: {}", names.join(", "));
            needs_review = true;
        }

        tracing::info!(unfilled = unfilled.len(), "Reinsertion completed");

        write_output(self.output.as_deref(), &document)?;
        Ok(if needs_review { EXIT_REVIEW } else { EXIT_OK })
    }
}
