//! Target-allocation transfer optimization.
//!
//! Given current asset values, target rates and linear constraints, find how
//! much to move into (or out of) each asset so that the achieved rates land as
//! close as possible to their targets while the transfers add up to the
//! requested amount.

pub mod constraints;
pub mod rates;
pub mod report;
pub mod score;
pub mod solver;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{info, warn};

use crate::config::PortfolioConfig;
use crate::error::DiversifyError;
use crate::portfolio::asset::validate_assets;
use crate::portfolio::{AllocationStatement, AllocationTargets, Asset, Constraint};
use crate::types::{with_metadata, ComputationOutput, Money};
use crate::DiversifyResult;

pub use constraints::{Bound, ConstraintRow, SalesPolicy};
pub use rates::{PortfolioIndex, RateSnapshot};
pub use report::{apply_transfers, AssetTransfer, ClassRate, TransferReport};
pub use score::{score_transfer, TargetRates};
pub use solver::SolverSettings;

use solver::Objective;

// ---------------------------------------------------------------------------
// Input / Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizationInput {
    pub assets: Vec<Asset>,
    pub allocation: Vec<AllocationStatement>,
    #[serde(default)]
    pub constraints: Vec<Constraint>,
    /// Net amount to add (positive) or withdraw (negative).
    pub total_amount: Money,
    /// Only allow money to flow into assets.
    #[serde(default)]
    pub forbid_sales: bool,
    #[serde(default)]
    pub solver: SolverSettings,
}

impl OptimizationInput {
    pub fn sales_policy(&self) -> SalesPolicy {
        if self.forbid_sales {
            SalesPolicy::ForbidSales
        } else {
            SalesPolicy::AllowSales
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizationOutput {
    pub asset_transfers: Vec<AssetTransfer>,
    pub class_rates: Vec<ClassRate>,
    /// Score at the truncated transfers actually reported.
    pub score: Decimal,
    /// Score at the solver's real-valued solution.
    pub raw_score: Decimal,
    pub iterations: u32,
    /// Largest constraint violation at the truncated transfers, in the
    /// constraints' own units.
    pub max_violation: Decimal,
}

// ---------------------------------------------------------------------------
// Pre-solve checks
// ---------------------------------------------------------------------------

/// Everything the solver needs, checked and indexed.
#[derive(Debug, Clone)]
pub struct PreparedProblem {
    pub index: PortfolioIndex,
    pub targets: TargetRates,
    pub rows: Vec<ConstraintRow>,
    /// Solver variables are `transfer / scale`.
    pub scale: Decimal,
    pub warnings: Vec<String>,
}

/// Largest `Σ value + |total_amount|` the solver accepts. Keeps every
/// intermediate product of the objective and its gradient inside `Decimal`.
pub const MAX_PORTFOLIO_SCALE: Money = dec!(1000000000000000000000);

/// Run every check that can fail before solving, in a fixed order: records,
/// targets, constraint references, then the starting point's denominators.
pub fn prepare(
    assets: &[Asset],
    allocation: &[AllocationStatement],
    constraints: &[Constraint],
    total_amount: Money,
    policy: SalesPolicy,
    config: &PortfolioConfig,
) -> DiversifyResult<PreparedProblem> {
    config.validate()?;
    validate_assets(assets, config)?;
    for constraint in constraints {
        constraint.validate()?;
    }

    let index = PortfolioIndex::new(assets)?;
    let allocation_targets = AllocationTargets::from_statements(allocation);
    let targets = TargetRates::resolve(&index, &allocation_targets)?;
    let rows = constraints::build_constraints(constraints, &index, total_amount, policy)?;
    index.evaluate(&index.zero_transfer())?;

    let scale = index
        .total_value()?
        .checked_add(total_amount.abs())
        .filter(|s| *s <= MAX_PORTFOLIO_SCALE)
        .ok_or_else(|| DiversifyError::InvalidInput {
            field: "assets".into(),
            reason: format!(
                "Total value plus the transferred amount must not exceed {}",
                MAX_PORTFOLIO_SCALE
            ),
        })?
        .max(Decimal::ONE);

    Ok(PreparedProblem {
        warnings: allocation_targets.sum_warnings(assets),
        index,
        targets,
        rows,
        scale,
    })
}

// ---------------------------------------------------------------------------
// Scaled objective
// ---------------------------------------------------------------------------

/// Scaled transfers beyond this multiple of the portfolio are never useful:
/// the budget and non-negativity rows keep every feasible one within 1.
const MAX_SCALED_TRANSFER: Decimal = dec!(10);
/// Asset rates beyond this are far outside any feasible point.
const MAX_RATE: Decimal = dec!(1000);
/// Smallest class or portfolio total accepted, as a fraction of the scale.
const MIN_SCALED_TOTAL: Decimal = dec!(0.000000001);
/// A failed solve that ends with a total this close to zero (as a fraction
/// of the scale) was pulled against the floor above.
const EMPTIED_SCALED_TOTAL: Decimal = dec!(0.0001);

/// The score as a function of `y = transfer / scale`.
struct TransferObjective<'a> {
    index: &'a PortfolioIndex,
    targets: &'a TargetRates,
    scale: Decimal,
}

impl TransferObjective<'_> {
    fn outside(&self) -> DiversifyError {
        DiversifyError::DegenerateDenominator {
            context: "trial transfer".into(),
        }
    }
}

impl Objective for TransferObjective<'_> {
    fn evaluate(&self, y: &[Decimal]) -> DiversifyResult<(Decimal, Vec<Decimal>)> {
        if y.iter().any(|v| v.abs() > MAX_SCALED_TRANSFER) {
            return Err(self.outside());
        }
        let transfer: Vec<Money> = y.iter().map(|v| *v * self.scale).collect();
        let snapshot = self.index.evaluate(&transfer)?;
        if !snapshot.totals_at_least(MIN_SCALED_TOTAL * self.scale)
            || snapshot.asset_rates.iter().any(|r| r.abs() > MAX_RATE)
        {
            return Err(self.outside());
        }
        let value = score::score_snapshot(&snapshot, self.targets);
        let grad = score::score_gradient(self.index, &snapshot, self.targets)?
            .into_iter()
            .map(|g| g.checked_mul(self.scale))
            .collect::<Option<Vec<Decimal>>>()
            .ok_or_else(|| self.outside())?;
        Ok((value, grad))
    }
}

/// When the solver gave up next to an emptied class (or portfolio), the
/// targets ask for a total of zero, where rates are undefined. Report that
/// instead of the solver's own failure.
fn emptied_total(index: &PortfolioIndex, y: &[Decimal], scale: Decimal) -> Option<DiversifyError> {
    let transfer: Vec<Money> = y.iter().map(|v| v.checked_mul(scale)).collect::<Option<_>>()?;
    let snapshot = index.evaluate(&transfer).ok()?;
    let near_zero = EMPTIED_SCALED_TOTAL * scale;
    if snapshot.total < near_zero {
        return Some(DiversifyError::DegenerateDenominator {
            context: "portfolio at the best reachable allocation".into(),
        });
    }
    let class = snapshot.class_totals.iter().position(|t| *t < near_zero)?;
    Some(DiversifyError::DegenerateDenominator {
        context: format!(
            "asset class '{}' at the best reachable allocation",
            index.classes()[class]
        ),
    })
}

/// Solver noise below this many decimal places is dropped before truncation,
/// so an exact answer such as 5 that comes back as 4.9999999999 stays 5.
const NOISE_DP: u32 = 6;
const ROUNDING: &str = "transfers rounded to 6 decimal places, then truncated toward zero";

fn truncate_toward_zero(raw: &[Money]) -> Vec<Money> {
    raw.iter()
        .map(|t| {
            let whole = t.round_dp(NOISE_DP).trunc();
            if whole.is_zero() {
                Decimal::ZERO
            } else {
                whole
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Find the transfers that bring the portfolio closest to its targets.
///
/// Transfers are truncated toward zero before reporting; the truncated vector
/// is not re-checked against the constraints, but any drift is listed in the
/// warnings.
pub fn optimize_transfers(
    input: &OptimizationInput,
    config: &PortfolioConfig,
) -> DiversifyResult<ComputationOutput<OptimizationOutput>> {
    let start = Instant::now();
    let policy = input.sales_policy();
    let problem = prepare(
        &input.assets,
        &input.allocation,
        &input.constraints,
        input.total_amount,
        policy,
        config,
    )?;
    let mut warnings = problem.warnings.clone();
    let index = &problem.index;
    let scale = problem.scale;

    let mut scaled_rows = Vec::with_capacity(problem.rows.len());
    for row in &problem.rows {
        let coefficients = row
            .coefficients
            .iter()
            .map(|a| a.checked_mul(scale))
            .collect::<Option<Vec<Decimal>>>()
            .ok_or_else(|| DiversifyError::InvalidInput {
                field: "constraints".into(),
                reason: format!("Coefficients of '{}' are too large", row.label),
            })?;
        scaled_rows.push(ConstraintRow {
            label: row.label.clone(),
            coefficients,
            bound: row.bound,
        });
    }

    let objective = TransferObjective {
        index,
        targets: &problem.targets,
        scale,
    };
    let solution = match solver::try_minimize(
        &objective,
        &index.zero_transfer(),
        &scaled_rows,
        &input.solver,
    ) {
        Ok(solution) => solution,
        Err(unsolved) => {
            let emptied = unsolved
                .last_iterate
                .as_deref()
                .and_then(|y| emptied_total(index, y, scale));
            return Err(match emptied {
                Some(degenerate) => {
                    warn!(cause = %unsolved.error, "solver stopped against an emptied total");
                    degenerate
                }
                None => unsolved.error,
            });
        }
    };

    let raw_transfer: Vec<Money> = solution.x.iter().map(|y| *y * scale).collect();
    let raw_score = score::score(index, &problem.targets, &raw_transfer)?;
    let transfer = truncate_toward_zero(&raw_transfer);
    let report = report::format_report(index, &problem.targets, &transfer)?;
    let final_score = score::score(index, &problem.targets, &transfer)?;

    let moved: Money = transfer.iter().copied().sum();
    if moved != input.total_amount {
        warnings.push(format!(
            "Truncated transfers sum to {} instead of {}",
            moved,
            input.total_amount.normalize()
        ));
    }
    // rows are user constraints, then the budget row, then the identity rows
    let budget_row = input.constraints.len();
    let mut max_violation = Decimal::ZERO;
    for (i, row) in problem.rows.iter().enumerate() {
        let violation = row.violation(&transfer);
        max_violation = max_violation.max(violation);
        if violation > Decimal::ZERO && i != budget_row {
            warnings.push(format!(
                "Constraint '{}' is off by {} after truncation",
                row.label,
                violation.normalize()
            ));
        }
    }
    for w in &warnings {
        warn!("{}", w);
    }

    info!(
        assets = index.len(),
        classes = index.classes().len(),
        outer_iterations = solution.outer_iterations,
        inner_iterations = solution.inner_iterations,
        score = %final_score.round_dp(6),
        raw_score = %raw_score.round_dp(6),
        "transfer optimization finished"
    );

    let output = OptimizationOutput {
        asset_transfers: report.asset_transfers,
        class_rates: report.class_rates,
        score: final_score,
        raw_score,
        iterations: solution.outer_iterations,
        max_violation,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Target-allocation transfer optimization (augmented Lagrangian, BFGS inner solves)",
        &serde_json::json!({
            "currency": config.currency.code(),
            "assets": index.len(),
            "asset_classes": index.classes().len(),
            "constraints": input.constraints.len(),
            "total_amount": input.total_amount.to_string(),
            "sales_policy": policy,
            "variable_scale": scale.to_string(),
            "rounding": ROUNDING,
            "solver": input.solver,
        }),
        warnings,
        elapsed,
        output,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::portfolio::Operator;
    use crate::types::Currency;

    fn config() -> PortfolioConfig {
        PortfolioConfig::new(
            Currency::EUR,
            vec!["stocks".into(), "bonds".into(), "cash".into()],
        )
        .unwrap()
    }

    fn input(
        assets: Vec<Asset>,
        allocation: Vec<AllocationStatement>,
        total_amount: Money,
    ) -> OptimizationInput {
        OptimizationInput {
            assets,
            allocation,
            constraints: vec![],
            total_amount,
            forbid_sales: false,
            solver: SolverSettings::default(),
        }
    }

    fn balanced() -> OptimizationInput {
        input(
            vec![
                Asset::new("ETF World", "stocks", dec!(100)),
                Asset::new("Bond Fund", "bonds", dec!(100)),
            ],
            vec![
                AllocationStatement::asset("ETF World", dec!(1)),
                AllocationStatement::asset("Bond Fund", dec!(1)),
                AllocationStatement::asset_class("stocks", dec!(0.5)),
                AllocationStatement::asset_class("bonds", dec!(0.5)),
            ],
            dec!(0),
        )
    }

    fn same_class() -> OptimizationInput {
        input(
            vec![
                Asset::new("ETF World", "stocks", dec!(100)),
                Asset::new("ETF EM", "stocks", dec!(0)),
            ],
            vec![
                AllocationStatement::asset("ETF World", dec!(0.5)),
                AllocationStatement::asset("ETF EM", dec!(0.5)),
                AllocationStatement::asset_class("stocks", dec!(1)),
            ],
            dec!(100),
        )
    }

    fn transfers(out: &ComputationOutput<OptimizationOutput>) -> Vec<Money> {
        out.result
            .asset_transfers
            .iter()
            .map(|t| t.transfer_value)
            .collect()
    }

    #[test]
    fn test_already_on_target() {
        let out = optimize_transfers(&balanced(), &config()).unwrap();
        assert_eq!(transfers(&out), vec![Decimal::ZERO, Decimal::ZERO]);
        assert_eq!(out.result.score, Decimal::ZERO);
        assert!(out.warnings.is_empty(), "warnings: {:?}", out.warnings);
    }

    #[test]
    fn test_fills_empty_asset() {
        let out = optimize_transfers(&same_class(), &config()).unwrap();
        let lines = &out.result.asset_transfers;
        assert!((lines[0].new_value - dec!(100)).abs() <= dec!(1));
        assert!((lines[1].new_value - dec!(100)).abs() <= dec!(1));
        assert!(out.result.raw_score < dec!(0.0001), "raw {}", out.result.raw_score);
        assert!(out.result.score < dec!(0.1), "score {}", out.result.score);
    }

    #[test]
    fn test_equality_constraint_pins_asset() {
        let mut inp = input(
            vec![
                Asset::new("ETF World", "stocks", dec!(100)),
                Asset::new("ETF EM", "stocks", dec!(100)),
            ],
            vec![
                AllocationStatement::asset("ETF World", dec!(0.5)),
                AllocationStatement::asset("ETF EM", dec!(0.5)),
                AllocationStatement::asset_class("stocks", dec!(1)),
            ],
            dec!(50),
        );
        inp.constraints = vec![Constraint::new(&[("ETF World", dec!(1))], Operator::Eq, dec!(0))];
        let out = optimize_transfers(&inp, &config()).unwrap();
        let t = transfers(&out);
        assert_eq!(t[0], Decimal::ZERO);
        assert!((t[1] - dec!(50)).abs() <= dec!(1));
        // 100/250 and 150/250 against 0.5 each
        assert!((out.result.raw_score - dec!(20)).abs() < dec!(0.001));
    }

    #[test]
    fn test_unknown_constraint_asset() {
        let mut inp = balanced();
        inp.constraints = vec![Constraint::new(&[("Gold", dec!(1))], Operator::Leq, dec!(10))];
        assert!(matches!(
            optimize_transfers(&inp, &config()),
            Err(DiversifyError::UnknownConstraintAsset { .. })
        ));
    }

    #[test]
    fn test_missing_target_checked_before_constraints() {
        let mut inp = balanced();
        inp.allocation.retain(|s| s.object_name != "Bond Fund");
        inp.constraints = vec![Constraint::new(&[("Gold", dec!(1))], Operator::Leq, dec!(10))];
        match optimize_transfers(&inp, &config()) {
            Err(DiversifyError::MissingTarget { object_name, .. }) => {
                assert_eq!(object_name, "Bond Fund")
            }
            other => panic!("expected MissingTarget, got {:?}", other.map(|o| o.result)),
        }
    }

    #[test]
    fn test_unknown_class_rejected() {
        let mut inp = balanced();
        inp.assets.push(Asset::new("Gold", "commodities", dec!(10)));
        assert!(matches!(
            optimize_transfers(&inp, &config()),
            Err(DiversifyError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_empty_portfolio_is_degenerate() {
        let mut inp = same_class();
        inp.assets[0].value = dec!(0);
        assert!(matches!(
            optimize_transfers(&inp, &config()),
            Err(DiversifyError::DegenerateDenominator { .. })
        ));
    }

    #[test]
    fn test_withdrawal_respects_holdings() {
        let inp = input(
            vec![
                Asset::new("ETF World", "stocks", dec!(300)),
                Asset::new("Bond Fund", "bonds", dec!(100)),
            ],
            vec![
                AllocationStatement::asset("ETF World", dec!(1)),
                AllocationStatement::asset("Bond Fund", dec!(1)),
                AllocationStatement::asset_class("stocks", dec!(0.5)),
                AllocationStatement::asset_class("bonds", dec!(0.5)),
            ],
            dec!(-200),
        );
        let out = optimize_transfers(&inp, &config()).unwrap();
        for line in &out.result.asset_transfers {
            assert!(line.new_value >= dec!(-1), "{} ends at {}", line.asset_name, line.new_value);
        }
        // 100 / 100 is reachable
        let t = transfers(&out);
        assert!((t[0] + dec!(200)).abs() <= dec!(1));
        assert!(t[1].abs() <= dec!(1));
    }

    #[test]
    fn test_forbid_sales() {
        let mut inp = input(
            vec![
                Asset::new("ETF World", "stocks", dec!(300)),
                Asset::new("Bond Fund", "bonds", dec!(100)),
            ],
            vec![
                AllocationStatement::asset("ETF World", dec!(1)),
                AllocationStatement::asset("Bond Fund", dec!(1)),
                AllocationStatement::asset_class("stocks", dec!(0.5)),
                AllocationStatement::asset_class("bonds", dec!(0.5)),
            ],
            dec!(100),
        );
        inp.forbid_sales = true;
        let out = optimize_transfers(&inp, &config()).unwrap();
        let t = transfers(&out);
        assert!(t.iter().all(|v| *v >= Decimal::ZERO), "transfers {:?}", t);
        // everything goes to bonds: 300 / 200
        assert!((t[1] - dec!(100)).abs() <= dec!(1));
    }

    #[test]
    fn test_idempotent() {
        let a = optimize_transfers(&same_class(), &config()).unwrap();
        let b = optimize_transfers(&same_class(), &config()).unwrap();
        assert_eq!(a.result.score, b.result.score);
        assert_eq!(transfers(&a), transfers(&b));
    }

    #[test]
    fn test_infeasible_constraints() {
        let mut inp = same_class();
        inp.constraints = vec![
            Constraint::new(&[("ETF World", dec!(1))], Operator::Geq, dec!(80)),
            Constraint::new(&[("ETF EM", dec!(1))], Operator::Geq, dec!(80)),
        ];
        assert!(matches!(
            optimize_transfers(&inp, &config()),
            Err(DiversifyError::OptimizationFailed { .. })
        ));
    }

    #[test]
    fn test_target_sum_warning() {
        let mut inp = balanced();
        inp.allocation.push(AllocationStatement::asset_class("stocks", dec!(0.6)));
        let out = optimize_transfers(&inp, &config()).unwrap();
        assert!(out
            .warnings
            .iter()
            .any(|w| w.starts_with("Asset class targets sum to 1.1")));
    }

    #[test]
    fn test_output_envelope() {
        let out = optimize_transfers(&balanced(), &config()).unwrap();
        assert_eq!(out.metadata.precision, "rust_decimal_128bit");
        assert_eq!(out.assumptions["currency"], "EUR");
        assert_eq!(out.assumptions["sales_policy"], "allow_sales");
        assert!(out.methodology.contains("augmented Lagrangian"));
    }

    #[test]
    fn test_input_wire_defaults() {
        let inp: OptimizationInput = serde_json::from_str(
            r#"{
                "assets": [{"name": "Cash", "class_name": "cash", "value": "10"}],
                "allocation": [
                    {"object_type": "asset", "object_name": "Cash", "rate": "1"},
                    {"object_type": "asset_class", "object_name": "cash", "rate": "1"}
                ],
                "total_amount": "5"
            }"#,
        )
        .unwrap();
        assert!(inp.constraints.is_empty());
        assert!(!inp.forbid_sales);
        assert_eq!(inp.solver, SolverSettings::default());
        let out = optimize_transfers(&inp, &config()).unwrap();
        assert_eq!(transfers(&out), vec![dec!(5)]);
        assert_eq!(out.assumptions["rounding"], ROUNDING);
    }

    #[test]
    fn test_truncation_drops_solver_noise_first() {
        let raw = vec![
            dec!(4.9999999999),
            dec!(-3.0000000001),
            dec!(7.9),
            dec!(-0.4),
            dec!(12.4999),
        ];
        assert_eq!(
            truncate_toward_zero(&raw),
            vec![dec!(5), dec!(-3), dec!(7), Decimal::ZERO, dec!(12)]
        );
        // negative zero is normalized
        assert!(!truncate_toward_zero(&[dec!(-0.4)])[0].is_sign_negative());
    }

    #[test]
    fn test_zero_class_target_names_emptied_class() {
        let mut inp = balanced();
        inp.allocation.push(AllocationStatement::asset_class("stocks", dec!(1)));
        inp.allocation.push(AllocationStatement::asset_class("bonds", dec!(0)));
        // the zero transfer is feasible, but the best allocation empties bonds
        match optimize_transfers(&inp, &config()) {
            Err(DiversifyError::DegenerateDenominator { context }) => {
                assert!(context.starts_with("asset class 'bonds'"), "context: {}", context)
            }
            other => panic!("expected DegenerateDenominator, got {:?}", other.map(|o| o.result)),
        }
    }

    #[test]
    fn test_zero_class_target_with_two_assets() {
        let mut inp = balanced();
        inp.assets.push(Asset::new("Gilts", "bonds", dec!(50)));
        inp.allocation.push(AllocationStatement::asset("Bond Fund", dec!(0.5)));
        inp.allocation.push(AllocationStatement::asset("Gilts", dec!(0.5)));
        inp.allocation.push(AllocationStatement::asset_class("stocks", dec!(1)));
        inp.allocation.push(AllocationStatement::asset_class("bonds", dec!(0)));
        assert!(matches!(
            optimize_transfers(&inp, &config()),
            Err(DiversifyError::DegenerateDenominator { context }) if context.contains("'bonds'")
        ));
    }

    #[test]
    fn test_fractional_values_give_integer_new_values() {
        let inp = input(
            vec![
                Asset::new("ETF World", "stocks", dec!(100.5)),
                Asset::new("ETF EM", "stocks", dec!(0.25)),
            ],
            vec![
                AllocationStatement::asset("ETF World", dec!(0.5)),
                AllocationStatement::asset("ETF EM", dec!(0.5)),
                AllocationStatement::asset_class("stocks", dec!(1)),
            ],
            dec!(100),
        );
        let out = optimize_transfers(&inp, &config()).unwrap();
        for line in &out.result.asset_transfers {
            assert_eq!(line.new_value, line.new_value.trunc(), "{}", line.asset_name);
            assert_eq!(line.transfer_value, line.transfer_value.trunc());
        }
        let updated = apply_transfers(&inp.assets, &out.result.asset_transfers).unwrap();
        assert_eq!(updated[0].value, dec!(100));
        assert!((updated[1].value - dec!(100)).abs() <= dec!(1));
    }

    #[test]
    fn test_values_beyond_decimal_range_rejected() {
        let inp = input(
            vec![
                Asset::new("ETF World", "stocks", dec!(50000000000000000000000000000)),
                Asset::new("Bond Fund", "bonds", dec!(50000000000000000000000000000)),
            ],
            balanced().allocation,
            dec!(0),
        );
        match optimize_transfers(&inp, &config()) {
            Err(DiversifyError::InvalidInput { field, .. }) => assert_eq!(field, "assets"),
            other => panic!("expected InvalidInput, got {:?}", other.map(|o| o.result)),
        }
    }

    #[test]
    fn test_portfolio_scale_cap() {
        let mut inp = balanced();
        inp.assets[0].value = MAX_PORTFOLIO_SCALE;
        assert!(matches!(
            optimize_transfers(&inp, &config()),
            Err(DiversifyError::InvalidInput { .. })
        ));
        inp.assets[0].value = dec!(100);
        inp.total_amount = -MAX_PORTFOLIO_SCALE;
        assert!(matches!(
            optimize_transfers(&inp, &config()),
            Err(DiversifyError::InvalidInput { .. })
        ));
    }
}
