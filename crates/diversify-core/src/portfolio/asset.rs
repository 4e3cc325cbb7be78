use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::PortfolioConfig;
use crate::error::DiversifyError;
use crate::types::Money;
use crate::DiversifyResult;

/// A named, valued holding belonging to exactly one asset class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    /// Unique key across the whole portfolio.
    pub name: String,
    pub class_name: String,
    #[serde(default)]
    pub value: Money,
}

impl Asset {
    pub fn new(name: impl Into<String>, class_name: impl Into<String>, value: Money) -> Self {
        Self {
            name: name.into(),
            class_name: class_name.into(),
            value,
        }
    }

    /// Validate the record against the configured class set.
    pub fn validate(&self, config: &PortfolioConfig) -> DiversifyResult<()> {
        if self.name.is_empty() {
            return Err(DiversifyError::InvalidInput {
                field: "name".into(),
                reason: "Name cannot be empty".into(),
            });
        }
        if !config.contains_class(&self.class_name) {
            return Err(DiversifyError::InvalidInput {
                field: format!("{}.class_name", self.name),
                reason: format!("Class {} is not in the list of asset classes", self.class_name),
            });
        }
        if self.value < Decimal::ZERO {
            return Err(DiversifyError::InvalidInput {
                field: format!("{}.value", self.name),
                reason: "Value cannot be negative".into(),
            });
        }
        Ok(())
    }
}

/// Validate every asset and reject repeated names.
///
/// Names are the join key for allocation statements and constraints, so two
/// assets sharing a name (even in different classes) would make lookups
/// ambiguous.
pub fn validate_assets(assets: &[Asset], config: &PortfolioConfig) -> DiversifyResult<()> {
    if assets.is_empty() {
        return Err(DiversifyError::InvalidInput {
            field: "assets".into(),
            reason: "At least one asset is required".into(),
        });
    }
    for (i, asset) in assets.iter().enumerate() {
        asset.validate(config)?;
        if let Some(other) = assets[..i].iter().find(|a| a.name == asset.name) {
            return Err(DiversifyError::InvalidInput {
                field: format!("{}.name", asset.name),
                reason: format!(
                    "Asset name is not unique (classes '{}' and '{}')",
                    other.class_name, asset.class_name
                ),
            });
        }
    }
    Ok(())
}
