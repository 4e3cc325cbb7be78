use clap::Args;
use serde::Serialize;
use serde_json::Value;
use std::time::Instant;

use diversify_core::types::with_metadata;

use crate::commands::load_snapshot;
use crate::input;

/// Arguments for snapshot validation
#[derive(Args)]
pub struct ValidateArgs {
    /// Path to the portfolio snapshot (JSON); read from stdin when omitted
    #[arg(long)]
    pub input: Option<String>,

    /// Path to the YAML configuration listing the asset classes
    #[arg(long, default_value = "diversify.yml")]
    pub config: String,
}

#[derive(Debug, Serialize)]
struct ValidationSummary {
    valid: bool,
    assets: usize,
    allocation_statements: usize,
    constraints: usize,
}

pub fn run_validate(args: ValidateArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let start = Instant::now();
    let config = input::file::read_config(&args.config)?;
    let snapshot = load_snapshot(&args.input)?;

    let warnings = snapshot.validate(&config)?;

    let summary = ValidationSummary {
        valid: true,
        assets: snapshot.assets.len(),
        allocation_statements: snapshot.allocation.len(),
        constraints: snapshot.constraints.len(),
    };
    let output = with_metadata(
        "Pre-solve validation (records, targets, constraint references, starting rates)",
        &serde_json::json!({
            "currency": config.currency.code(),
            "asset_classes": config.asset_classes,
        }),
        warnings,
        start.elapsed().as_micros() as u64,
        summary,
    );
    Ok(serde_json::to_value(output)?)
}
