//! Portfolio configuration: the set of asset classes assets may belong to and
//! the currency reports are expressed in.
//!
//! The configuration is always passed explicitly to whatever validates class
//! names. Loading it from disk is the caller's job.

use serde::{Deserialize, Serialize};

use crate::error::DiversifyError;
use crate::types::Currency;
use crate::DiversifyResult;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortfolioConfig {
    #[serde(default)]
    pub currency: Currency,
    /// Enumerated asset classes, in display order.
    pub asset_classes: Vec<String>,
}

impl PortfolioConfig {
    pub fn new(currency: Currency, asset_classes: Vec<String>) -> DiversifyResult<Self> {
        let config = Self {
            currency,
            asset_classes,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check the class set is usable: non-empty, no blank or repeated names.
    pub fn validate(&self) -> DiversifyResult<()> {
        if self.asset_classes.is_empty() {
            return Err(DiversifyError::ConfigError(
                "asset_classes must list at least one class".into(),
            ));
        }
        for (i, class) in self.asset_classes.iter().enumerate() {
            if class.trim().is_empty() {
                return Err(DiversifyError::ConfigError(format!(
                    "asset_classes[{}] is empty",
                    i
                )));
            }
            if self.asset_classes[..i].contains(class) {
                return Err(DiversifyError::ConfigError(format!(
                    "asset class '{}' is listed twice",
                    class
                )));
            }
        }
        Ok(())
    }

    pub fn contains_class(&self, class_name: &str) -> bool {
        self.asset_classes.iter().any(|c| c == class_name)
    }
}
