//! Assembly of the linear constraint set over the transfer vector.
//!
//! User constraints come first, then the budget row and one non-negativity
//! row per asset. Row order only affects the solver's path.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::DiversifyError;
use crate::optimization::rates::PortfolioIndex;
use crate::portfolio::{Constraint, Operator};
use crate::types::Money;
use crate::DiversifyResult;

/// Right-hand side of a linear row `coefficients · transfer`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Bound {
    Equal(Decimal),
    AtMost(Decimal),
    AtLeast(Decimal),
}

impl Bound {
    /// Amount by which `activity` breaks the bound (zero when satisfied).
    pub fn violation(&self, activity: Decimal) -> Decimal {
        match *self {
            Bound::Equal(b) => (activity - b).abs(),
            Bound::AtMost(b) => (activity - b).max(Decimal::ZERO),
            Bound::AtLeast(b) => (b - activity).max(Decimal::ZERO),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstraintRow {
    pub label: String,
    pub coefficients: Vec<Decimal>,
    pub bound: Bound,
}

impl ConstraintRow {
    pub fn activity(&self, x: &[Decimal]) -> Decimal {
        self.coefficients
            .iter()
            .zip(x.iter())
            .map(|(a, xi)| *a * *xi)
            .sum()
    }

    pub fn violation(&self, x: &[Decimal]) -> Decimal {
        self.bound.violation(self.activity(x))
    }
}

/// Lower limit applied to each asset's transfer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SalesPolicy {
    /// Holdings may be sold down to zero: `value_i + transfer_i ≥ 0`.
    #[default]
    AllowSales,
    /// Money only flows in: `transfer_i ≥ 0`.
    ForbidSales,
}

/// Row for one stored constraint. Repeated mentions of an asset add up.
pub fn constraint_row(
    constraint: &Constraint,
    index: &PortfolioIndex,
) -> DiversifyResult<ConstraintRow> {
    let mut coefficients = vec![Decimal::ZERO; index.len()];
    for term in &constraint.assets {
        let position =
            index
                .position(&term.asset_name)
                .ok_or_else(|| DiversifyError::UnknownConstraintAsset {
                    asset_name: term.asset_name.clone(),
                })?;
        coefficients[position] += term.coef;
    }
    let bound = match constraint.operator {
        Operator::Eq => Bound::Equal(constraint.value),
        Operator::Leq => Bound::AtMost(constraint.value),
        Operator::Geq => Bound::AtLeast(constraint.value),
    };
    Ok(ConstraintRow {
        label: constraint.to_string(),
        coefficients,
        bound,
    })
}

/// `Σ transfer_i == total_amount`
pub fn budget_row(index: &PortfolioIndex, total_amount: Money) -> ConstraintRow {
    ConstraintRow {
        label: format!("total transfer = {}", total_amount.normalize()),
        coefficients: vec![Decimal::ONE; index.len()],
        bound: Bound::Equal(total_amount),
    }
}

/// Identity rows keeping every holding non-negative (or every transfer
/// non-negative under `ForbidSales`).
pub fn non_negativity_rows(index: &PortfolioIndex, policy: SalesPolicy) -> Vec<ConstraintRow> {
    (0..index.len())
        .map(|i| {
            let mut coefficients = vec![Decimal::ZERO; index.len()];
            coefficients[i] = Decimal::ONE;
            let (label, lower) = match policy {
                SalesPolicy::AllowSales => (
                    format!("{} stays non-negative", index.name(i)),
                    -index.values()[i],
                ),
                SalesPolicy::ForbidSales => {
                    (format!("{} is not sold", index.name(i)), Decimal::ZERO)
                }
            };
            ConstraintRow {
                label,
                coefficients,
                bound: Bound::AtLeast(lower),
            }
        })
        .collect()
}

/// Full constraint set for one optimization call.
pub fn build_constraints(
    constraints: &[Constraint],
    index: &PortfolioIndex,
    total_amount: Money,
    policy: SalesPolicy,
) -> DiversifyResult<Vec<ConstraintRow>> {
    let mut rows = constraints
        .iter()
        .map(|c| constraint_row(c, index))
        .collect::<DiversifyResult<Vec<_>>>()?;
    rows.push(budget_row(index, total_amount));
    rows.extend(non_negativity_rows(index, policy));
    Ok(rows)
}
