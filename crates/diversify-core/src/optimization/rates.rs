//! Allocation rates for a hypothetical transfer vector.
//!
//! An asset's rate is its share of its class total; a class's rate is its
//! share of the portfolio total. Both are evaluated at `value + transfer`.
//! Every function here is O(number of assets) and side-effect free.

use rust_decimal::Decimal;
use std::collections::HashMap;

use crate::error::DiversifyError;
use crate::portfolio::Asset;
use crate::types::{Money, Rate};
use crate::DiversifyResult;

/// Name and class lookups for one asset list, built once per call.
///
/// Classes are numbered in order of first appearance among the assets, so
/// every iteration over classes is deterministic.
#[derive(Debug, Clone)]
pub struct PortfolioIndex {
    names: Vec<String>,
    positions: HashMap<String, usize>,
    classes: Vec<String>,
    class_of: Vec<usize>,
    values: Vec<Money>,
}

/// Every holding, total and rate at one transfer vector.
#[derive(Debug, Clone)]
pub struct RateSnapshot {
    /// `value + transfer` per asset.
    pub holdings: Vec<Money>,
    /// Sum of holdings per class, in index class order.
    pub class_totals: Vec<Money>,
    pub total: Money,
    pub asset_rates: Vec<Rate>,
    pub class_rates: Vec<Rate>,
}

impl RateSnapshot {
    /// True when every class total and the portfolio total reach `floor`.
    pub fn totals_at_least(&self, floor: Money) -> bool {
        self.total >= floor && self.class_totals.iter().all(|t| *t >= floor)
    }
}

impl PortfolioIndex {
    pub fn new(assets: &[Asset]) -> DiversifyResult<Self> {
        let mut positions = HashMap::with_capacity(assets.len());
        let mut classes: Vec<String> = Vec::new();
        let mut class_of = Vec::with_capacity(assets.len());

        for (i, asset) in assets.iter().enumerate() {
            if positions.insert(asset.name.clone(), i).is_some() {
                return Err(DiversifyError::InvalidInput {
                    field: format!("{}.name", asset.name),
                    reason: "Asset name is not unique".into(),
                });
            }
            let class_id = match classes.iter().position(|c| *c == asset.class_name) {
                Some(id) => id,
                None => {
                    classes.push(asset.class_name.clone());
                    classes.len() - 1
                }
            };
            class_of.push(class_id);
        }

        Ok(Self {
            names: assets.iter().map(|a| a.name.clone()).collect(),
            positions,
            classes,
            class_of,
            values: assets.iter().map(|a| a.value).collect(),
        })
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn position(&self, asset_name: &str) -> Option<usize> {
        self.positions.get(asset_name).copied()
    }

    pub fn name(&self, i: usize) -> &str {
        &self.names[i]
    }

    /// Distinct classes present among the assets.
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn class_id(&self, class_name: &str) -> Option<usize> {
        self.classes.iter().position(|c| c == class_name)
    }

    /// Class id of asset `i`.
    pub fn class_of(&self, i: usize) -> usize {
        self.class_of[i]
    }

    pub fn values(&self) -> &[Money] {
        &self.values
    }

    pub fn total_value(&self) -> DiversifyResult<Money> {
        self.values
            .iter()
            .try_fold(Decimal::ZERO, |acc, v| add_money(acc, *v))
    }

    pub fn zero_transfer(&self) -> Vec<Money> {
        vec![Decimal::ZERO; self.len()]
    }

    /// Rate of asset `i` within its class after `transfer`.
    pub fn asset_rate(&self, transfer: &[Money], i: usize) -> DiversifyResult<Rate> {
        self.check_len(transfer)?;
        let class = self.class_of[i];
        let mut class_total = Decimal::ZERO;
        for j in (0..self.len()).filter(|&j| self.class_of[j] == class) {
            class_total = add_money(class_total, add_money(self.values[j], transfer[j])?)?;
        }
        let holding = add_money(self.values[i], transfer[i])?;
        holding
            .checked_div(class_total)
            .ok_or_else(|| self.degenerate_class(class))
    }

    /// Rate of `class_name` within the portfolio after `transfer`. A class no
    /// asset belongs to has rate zero.
    pub fn class_rate(&self, transfer: &[Money], class_name: &str) -> DiversifyResult<Rate> {
        self.check_len(transfer)?;
        let mut total = Decimal::ZERO;
        let mut class_total = Decimal::ZERO;
        for j in 0..self.len() {
            let holding = add_money(self.values[j], transfer[j])?;
            total = add_money(total, holding)?;
            if self.classes[self.class_of[j]] == class_name {
                class_total = add_money(class_total, holding)?;
            }
        }
        class_total
            .checked_div(total)
            .ok_or_else(degenerate_portfolio)
    }

    /// All asset and class rates in one pass.
    pub fn evaluate(&self, transfer: &[Money]) -> DiversifyResult<RateSnapshot> {
        self.check_len(transfer)?;
        let holdings = self
            .values
            .iter()
            .zip(transfer.iter())
            .map(|(v, t)| add_money(*v, *t))
            .collect::<DiversifyResult<Vec<Money>>>()?;

        let mut class_totals = vec![Decimal::ZERO; self.classes.len()];
        for (i, h) in holdings.iter().enumerate() {
            let class = self.class_of[i];
            class_totals[class] = add_money(class_totals[class], *h)?;
        }
        let total = class_totals
            .iter()
            .try_fold(Decimal::ZERO, |acc, ct| add_money(acc, *ct))?;

        let mut asset_rates = Vec::with_capacity(holdings.len());
        for (i, h) in holdings.iter().enumerate() {
            let class = self.class_of[i];
            let rate = h
                .checked_div(class_totals[class])
                .ok_or_else(|| self.degenerate_class(class))?;
            asset_rates.push(rate);
        }

        let class_rates = class_totals
            .iter()
            .map(|ct| ct.checked_div(total).ok_or_else(degenerate_portfolio))
            .collect::<DiversifyResult<Vec<Rate>>>()?;

        Ok(RateSnapshot {
            holdings,
            class_totals,
            total,
            asset_rates,
            class_rates,
        })
    }

    fn check_len(&self, transfer: &[Money]) -> DiversifyResult<()> {
        if transfer.len() != self.len() {
            return Err(DiversifyError::InvalidInput {
                field: "transfer".into(),
                reason: format!(
                    "Expected {} entries (one per asset), got {}",
                    self.len(),
                    transfer.len()
                ),
            });
        }
        Ok(())
    }

    fn degenerate_class(&self, class: usize) -> DiversifyError {
        DiversifyError::DegenerateDenominator {
            context: format!("asset class '{}'", self.classes[class]),
        }
    }
}

fn add_money(a: Money, b: Money) -> DiversifyResult<Money> {
    a.checked_add(b).ok_or_else(|| DiversifyError::InvalidInput {
        field: "assets".into(),
        reason: "Asset values and transfers add up beyond the decimal range".into(),
    })
}

fn degenerate_portfolio() -> DiversifyError {
    DiversifyError::DegenerateDenominator {
        context: "portfolio".into(),
    }
}
