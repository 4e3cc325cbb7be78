use napi::Result as NapiResult;
use napi_derive::napi;
use serde::Serialize;

use diversify_core::config::PortfolioConfig;
use diversify_core::optimization::{self, AssetTransfer, OptimizationInput};
use diversify_core::portfolio::{Asset, PortfolioSnapshot};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

fn parse_config(config_json: &str) -> NapiResult<PortfolioConfig> {
    let config: PortfolioConfig = serde_json::from_str(config_json).map_err(to_napi_error)?;
    config.validate().map_err(to_napi_error)?;
    Ok(config)
}

#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    warnings: Vec<String>,
}

// ---------------------------------------------------------------------------
// Optimization
// ---------------------------------------------------------------------------

#[napi]
pub fn optimize_transfers(input_json: String, config_json: String) -> NapiResult<String> {
    let config = parse_config(&config_json)?;
    let input: OptimizationInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = optimization::optimize_transfers(&input, &config).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn validate_snapshot(snapshot_json: String, config_json: String) -> NapiResult<String> {
    let config = parse_config(&config_json)?;
    let snapshot: PortfolioSnapshot =
        serde_json::from_str(&snapshot_json).map_err(to_napi_error)?;
    let warnings = snapshot.validate(&config).map_err(to_napi_error)?;
    serde_json::to_string(&ValidationResult {
        valid: true,
        warnings,
    })
    .map_err(to_napi_error)
}

/// Updated asset list (JSON array) from the `asset_transfers` of an
/// optimization result.
#[napi]
pub fn apply_transfers(assets_json: String, transfers_json: String) -> NapiResult<String> {
    let assets: Vec<Asset> = serde_json::from_str(&assets_json).map_err(to_napi_error)?;
    let transfers: Vec<AssetTransfer> =
        serde_json::from_str(&transfers_json).map_err(to_napi_error)?;
    let updated = optimization::apply_transfers(&assets, &transfers).map_err(to_napi_error)?;
    serde_json::to_string(&updated).map_err(to_napi_error)
}
