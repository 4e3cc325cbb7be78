use serde::{Deserialize, Serialize};

use crate::config::PortfolioConfig;
use crate::optimization::{prepare, OptimizationInput, SalesPolicy, SolverSettings};
use crate::portfolio::{AllocationStatement, Asset, Constraint};
use crate::types::Money;
use crate::DiversifyResult;

/// Read-only bundle of the three stored collections.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSnapshot {
    #[serde(default)]
    pub assets: Vec<Asset>,
    #[serde(default)]
    pub allocation: Vec<AllocationStatement>,
    #[serde(default)]
    pub constraints: Vec<Constraint>,
}

impl PortfolioSnapshot {
    /// Run every pre-solve check without solving. Returns the non-fatal
    /// warnings (target sums) when the snapshot is usable.
    pub fn validate(&self, config: &PortfolioConfig) -> DiversifyResult<Vec<String>> {
        let problem = prepare(
            &self.assets,
            &self.allocation,
            &self.constraints,
            Money::ZERO,
            SalesPolicy::AllowSales,
            config,
        )?;
        Ok(problem.warnings)
    }

    pub fn into_input(self, total_amount: Money, forbid_sales: bool) -> OptimizationInput {
        OptimizationInput {
            assets: self.assets,
            allocation: self.allocation,
            constraints: self.constraints,
            total_amount,
            forbid_sales,
            solver: SolverSettings::default(),
        }
    }

    /// Same snapshot with the asset list replaced, e.g. after applying a
    /// transfer report.
    pub fn with_assets(self, assets: Vec<Asset>) -> Self {
        Self { assets, ..self }
    }
}
