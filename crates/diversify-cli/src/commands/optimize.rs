use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;
use tracing::info;

use diversify_core::optimization::{apply_transfers, optimize_transfers};

use crate::commands::load_snapshot;
use crate::input;

/// Arguments for transfer optimization
#[derive(Args)]
pub struct OptimizeArgs {
    /// Path to the portfolio snapshot (JSON); read from stdin when omitted
    #[arg(long)]
    pub input: Option<String>,

    /// Path to the YAML configuration listing the asset classes
    #[arg(long, default_value = "diversify.yml")]
    pub config: String,

    /// Net amount to invest (negative to withdraw)
    #[arg(long, allow_hyphen_values = true)]
    pub total_amount: Decimal,

    /// Only add money to assets, never sell
    #[arg(long)]
    pub forbid_sales: bool,

    /// Outer solver iterations
    #[arg(long)]
    pub max_iterations: Option<u32>,

    /// Wall-clock limit for the solver, in milliseconds
    #[arg(long)]
    pub time_limit_ms: Option<u64>,

    /// Write the snapshot with updated asset values to this path
    #[arg(long)]
    pub apply: Option<String>,
}

pub fn run_optimize(args: OptimizeArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let config = input::file::read_config(&args.config)?;
    let snapshot = load_snapshot(&args.input)?;

    let mut request = snapshot
        .clone()
        .into_input(args.total_amount, args.forbid_sales);
    if let Some(n) = args.max_iterations {
        request.solver.max_iterations = n;
    }
    if let Some(ms) = args.time_limit_ms {
        request.solver.time_limit_ms = Some(ms);
    }

    let result = optimize_transfers(&request, &config)?;

    if let Some(ref path) = args.apply {
        let updated = apply_transfers(&snapshot.assets, &result.result.asset_transfers)?;
        input::file::write_json(path, &snapshot.with_assets(updated))?;
        info!(path = %path, "updated snapshot written");
    }

    Ok(serde_json::to_value(result)?)
}
