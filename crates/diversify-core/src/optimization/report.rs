use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::DiversifyError;
use crate::optimization::rates::PortfolioIndex;
use crate::optimization::score::TargetRates;
use crate::portfolio::Asset;
use crate::types::{Money, Rate};
use crate::DiversifyResult;

/// Per-asset line of a transfer report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetTransfer {
    pub asset_name: String,
    pub class_name: String,
    pub initial_value: Money,
    pub transfer_value: Money,
    /// `initial_value + transfer_value` in whole currency units.
    pub new_value: Money,
    pub initial_rate: Rate,
    pub new_rate: Rate,
    pub target_rate: Rate,
}

/// Per-class line of a transfer report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassRate {
    pub class_name: String,
    pub initial_rate: Rate,
    pub new_rate: Rate,
    pub target_rate: Rate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferReport {
    pub asset_transfers: Vec<AssetTransfer>,
    pub class_rates: Vec<ClassRate>,
}

/// Compare rates before and after `transfer`. Assets keep input order,
/// classes keep first-appearance order.
pub fn format_report(
    index: &PortfolioIndex,
    targets: &TargetRates,
    transfer: &[Money],
) -> DiversifyResult<TransferReport> {
    let before = index.evaluate(&index.zero_transfer())?;
    let after = index.evaluate(transfer)?;

    let asset_transfers = (0..index.len())
        .map(|i| AssetTransfer {
            asset_name: index.name(i).to_string(),
            class_name: index.classes()[index.class_of(i)].clone(),
            initial_value: index.values()[i],
            transfer_value: transfer[i],
            new_value: whole_units(after.holdings[i]),
            initial_rate: before.asset_rates[i],
            new_rate: after.asset_rates[i],
            target_rate: targets.assets[i],
        })
        .collect();

    let class_rates = index
        .classes()
        .iter()
        .enumerate()
        .map(|(c, class_name)| ClassRate {
            class_name: class_name.clone(),
            initial_rate: before.class_rates[c],
            new_rate: after.class_rates[c],
            target_rate: targets.classes[c],
        })
        .collect();

    Ok(TransferReport {
        asset_transfers,
        class_rates,
    })
}

fn whole_units(amount: Money) -> Money {
    let whole = amount.trunc();
    if whole.is_zero() {
        Money::ZERO
    } else {
        whole
    }
}

/// Asset list with every value replaced by the report's `new_value`.
/// The input list is left untouched.
pub fn apply_transfers(assets: &[Asset], transfers: &[AssetTransfer]) -> DiversifyResult<Vec<Asset>> {
    let by_name: HashMap<&str, &AssetTransfer> = transfers
        .iter()
        .map(|t| (t.asset_name.as_str(), t))
        .collect();

    assets
        .iter()
        .map(|asset| {
            let line = by_name
                .get(asset.name.as_str())
                .ok_or_else(|| DiversifyError::InvalidInput {
                    field: format!("{}.name", asset.name),
                    reason: "Asset is missing from the transfer report".into(),
                })?;
            Ok(Asset {
                value: line.new_value,
                ..asset.clone()
            })
        })
        .collect()
}
