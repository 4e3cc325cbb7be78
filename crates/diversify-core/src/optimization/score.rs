//! Objective: squared deviation of achieved rates from target rates.
//!
//! score(t) = 1000 × [ Σ_i (r_i(t) − a_i)² + Σ_c (R_c(t) − b_c)² ]
//!
//! where `r_i` is asset i's rate within its class and `R_c` is class c's rate
//! within the portfolio. The 1000 factor keeps the objective on the scale the
//! solver tolerances are tuned for.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::error::DiversifyError;
use crate::optimization::rates::{PortfolioIndex, RateSnapshot};
use crate::portfolio::{AllocationStatement, AllocationTargets, Asset};
use crate::types::{Money, Rate};
use crate::DiversifyResult;

pub const SCORE_SCALE: Decimal = dec!(1000);

/// Target rates aligned with a `PortfolioIndex`: one per asset, one per
/// class present among the assets.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetRates {
    pub assets: Vec<Rate>,
    pub classes: Vec<Rate>,
}

impl TargetRates {
    /// Look up every target once. Fails on the first asset or class without
    /// a recorded rate.
    pub fn resolve(index: &PortfolioIndex, targets: &AllocationTargets) -> DiversifyResult<Self> {
        let assets = (0..index.len())
            .map(|i| targets.asset_target(index.name(i)))
            .collect::<DiversifyResult<Vec<Rate>>>()?;
        let classes = index
            .classes()
            .iter()
            .map(|c| targets.class_target(c))
            .collect::<DiversifyResult<Vec<Rate>>>()?;
        Ok(Self { assets, classes })
    }
}

/// Score at `transfer`.
pub fn score(
    index: &PortfolioIndex,
    targets: &TargetRates,
    transfer: &[Money],
) -> DiversifyResult<Decimal> {
    let snapshot = index.evaluate(transfer)?;
    Ok(score_snapshot(&snapshot, targets))
}

/// Score from already-evaluated rates.
pub fn score_snapshot(snapshot: &RateSnapshot, targets: &TargetRates) -> Decimal {
    let asset_sum: Decimal = snapshot
        .asset_rates
        .iter()
        .zip(targets.assets.iter())
        .map(|(r, a)| (*r - *a) * (*r - *a))
        .sum();
    let class_sum: Decimal = snapshot
        .class_rates
        .iter()
        .zip(targets.classes.iter())
        .map(|(r, b)| (*r - *b) * (*r - *b))
        .sum();
    SCORE_SCALE * (asset_sum + class_sum)
}

/// Gradient of the score with respect to each transfer, in O(n).
///
/// For asset k in class c, with holdings v, class totals S, portfolio total T,
/// asset errors e and class errors E:
///
/// ∂/∂t_k = 1000 × [ 2e_k/S_c − 2W_c/S_c² + 2E_c/T − 2Z/T² ]
///
/// with W_c = Σ_{i∈c} e_i·v_i and Z = Σ_c E_c·S_c.
pub fn score_gradient(
    index: &PortfolioIndex,
    snapshot: &RateSnapshot,
    targets: &TargetRates,
) -> DiversifyResult<Vec<Decimal>> {
    let n = index.len();
    let n_classes = index.classes().len();
    let two = dec!(2);

    let asset_err: Vec<Decimal> = (0..n)
        .map(|i| snapshot.asset_rates[i] - targets.assets[i])
        .collect();
    let class_err: Vec<Decimal> = (0..n_classes)
        .map(|c| snapshot.class_rates[c] - targets.classes[c])
        .collect();

    let mut weighted = vec![Decimal::ZERO; n_classes];
    for i in 0..n {
        weighted[index.class_of(i)] += asset_err[i] * snapshot.holdings[i];
    }
    let z: Decimal = (0..n_classes)
        .map(|c| class_err[c] * snapshot.class_totals[c])
        .sum();

    let total = snapshot.total;
    if total.is_zero() {
        return Err(DiversifyError::DegenerateDenominator {
            context: "portfolio".into(),
        });
    }
    let portfolio_term = z / total / total;

    let mut class_terms = Vec::with_capacity(n_classes);
    for c in 0..n_classes {
        let s = snapshot.class_totals[c];
        if s.is_zero() {
            return Err(DiversifyError::DegenerateDenominator {
                context: format!("asset class '{}'", index.classes()[c]),
            });
        }
        class_terms.push((s, weighted[c] / s / s, class_err[c] / total));
    }

    Ok((0..n)
        .map(|k| {
            let (s, w_term, e_term) = class_terms[index.class_of(k)];
            SCORE_SCALE * two * (asset_err[k] / s - w_term + e_term - portfolio_term)
        })
        .collect())
}

/// Score a transfer vector straight from records. Builds the lookups on every
/// call; use `score` with a prepared index inside loops.
pub fn score_transfer(
    assets: &[Asset],
    allocation: &[AllocationStatement],
    transfer: &[Money],
) -> DiversifyResult<Decimal> {
    let index = PortfolioIndex::new(assets)?;
    let targets = TargetRates::resolve(&index, &AllocationTargets::from_statements(allocation))?;
    score(&index, &targets, transfer)
}
