//! Linearly constrained local minimization.
//!
//! Augmented Lagrangian (Powell–Hestenes–Rockafellar) outer loop over the
//! constraint rows, BFGS inner loop with Armijo backtracking on the
//! unconstrained augmented function. All arithmetic is `Decimal`; every
//! product that can grow with the penalty is checked, and an overflow is
//! treated like a rejected trial point.

use rust_decimal::{Decimal, MathematicalOps};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, trace};

use crate::error::DiversifyError;
use crate::optimization::constraints::{Bound, ConstraintRow};
use crate::DiversifyResult;

/// A smooth function with its gradient.
///
/// Points outside the function's domain are reported as
/// `DegenerateDenominator`; the solver steps back from them. Any other error
/// aborts the solve.
pub trait Objective {
    fn evaluate(&self, x: &[Decimal]) -> DiversifyResult<(Decimal, Vec<Decimal>)>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverSettings {
    /// Augmented Lagrangian (outer) iterations.
    pub max_iterations: u32,
    /// BFGS iterations per outer iteration.
    pub max_inner_iterations: u32,
    /// Inner stopping threshold on the gradient's largest component.
    pub tolerance: Decimal,
    /// Largest accepted constraint violation, in normalized row units.
    pub feasibility_tolerance: Decimal,
    pub initial_penalty: Decimal,
    pub max_penalty: Decimal,
    /// Wall-clock budget; `None` disables it.
    pub time_limit_ms: Option<u64>,
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            max_iterations: 50,
            max_inner_iterations: 500,
            tolerance: dec!(0.00000001),
            feasibility_tolerance: dec!(0.000000001),
            initial_penalty: dec!(10),
            max_penalty: dec!(10_000_000_000),
            time_limit_ms: Some(10_000),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Solution {
    pub x: Vec<Decimal>,
    pub objective: Decimal,
    pub outer_iterations: u32,
    pub inner_iterations: u32,
    /// Largest violation over the normalized rows at `x`.
    pub max_violation: Decimal,
}

const ARMIJO_C1: Decimal = dec!(0.0001);
const MAX_BACKTRACKS: usize = 60;
const CURVATURE_RATIO: Decimal = dec!(0.00000001);
const MIN_CURVATURE: Decimal = dec!(0.000000000000000000000001);
const STALL_RATIO: Decimal = dec!(0.00000000000000000001);
const PENALTY_GROWTH: Decimal = dec!(10);
const REQUIRED_PROGRESS: Decimal = dec!(0.25);
const STAGNATION_LIMIT: u32 = 3;
const PIVOT_TOLERANCE: Decimal = dec!(0.000000000001);

// ---------------------------------------------------------------------------
// Normalized constraint set
// ---------------------------------------------------------------------------

/// `a · x = b`, or `a · x ≥ b` for inequalities.
#[derive(Debug, Clone)]
struct Row {
    a: Vec<Decimal>,
    b: Decimal,
}

impl Row {
    fn residual(&self, x: &[Decimal]) -> Option<Decimal> {
        Some(dot(&self.a, x)? - self.b)
    }
}

#[derive(Debug, Clone, Default)]
struct Normalized {
    equalities: Vec<Row>,
    inequalities: Vec<Row>,
}

impl Normalized {
    /// Divide every row by its largest coefficient and turn upper bounds into
    /// lower bounds. All-zero rows are dropped when `0 <op> b` holds and make
    /// the problem infeasible otherwise.
    fn from_rows(rows: &[ConstraintRow], n: usize) -> DiversifyResult<Self> {
        let mut out = Self::default();
        for row in rows {
            if row.coefficients.len() != n {
                return Err(DiversifyError::InvalidInput {
                    field: format!("constraint '{}'", row.label),
                    reason: format!(
                        "Expected {} coefficients, got {}",
                        n,
                        row.coefficients.len()
                    ),
                });
            }
            let scale = row
                .coefficients
                .iter()
                .map(|a| a.abs())
                .max()
                .unwrap_or(Decimal::ZERO);
            if scale.is_zero() {
                if row.bound.violation(Decimal::ZERO) > Decimal::ZERO {
                    return Err(DiversifyError::OptimizationFailed {
                        reason: format!("constraint '{}' can never be satisfied", row.label),
                        iterations: 0,
                    });
                }
                continue;
            }
            let a: Vec<Decimal> = row.coefficients.iter().map(|c| *c / scale).collect();
            match row.bound {
                Bound::Equal(b) => out.equalities.push(Row { a, b: b / scale }),
                Bound::AtLeast(b) => out.inequalities.push(Row { a, b: b / scale }),
                Bound::AtMost(b) => out.inequalities.push(Row {
                    a: a.iter().map(|c| -*c).collect(),
                    b: -b / scale,
                }),
            }
        }
        Ok(out)
    }

    fn max_violation(&self, x: &[Decimal]) -> Option<Decimal> {
        let mut worst = Decimal::ZERO;
        for row in &self.equalities {
            worst = worst.max(row.residual(x)?.abs());
        }
        for row in &self.inequalities {
            worst = worst.max((-row.residual(x)?).max(Decimal::ZERO));
        }
        Some(worst)
    }
}

// ---------------------------------------------------------------------------
// Augmented Lagrangian
// ---------------------------------------------------------------------------

struct Augmented<'a, O: Objective> {
    objective: &'a O,
    constraints: &'a Normalized,
    lambda: &'a [Decimal],
    mu: &'a [Decimal],
    rho: Decimal,
}

impl<O: Objective> Augmented<'_, O> {
    /// `None` when `x` is outside the objective's domain or the penalty terms
    /// overflow.
    fn evaluate(&self, x: &[Decimal]) -> DiversifyResult<Option<(Decimal, Vec<Decimal>)>> {
        let (mut value, mut grad) = match self.objective.evaluate(x) {
            Ok(eval) => eval,
            Err(DiversifyError::DegenerateDenominator { .. }) => return Ok(None),
            Err(e) => return Err(e),
        };
        Ok(self
            .add_penalties(x, &mut value, &mut grad)
            .map(|_| (value, grad)))
    }

    fn add_penalties(&self, x: &[Decimal], value: &mut Decimal, grad: &mut [Decimal]) -> Option<()> {
        let half_rho = self.rho / dec!(2);
        for (row, lambda) in self.constraints.equalities.iter().zip(self.lambda) {
            let c = row.residual(x)?;
            let term = lambda
                .checked_mul(c)?
                .checked_add(half_rho.checked_mul(c.checked_mul(c)?)?)?;
            *value = value.checked_add(term)?;
            let weight = lambda.checked_add(self.rho.checked_mul(c)?)?;
            axpy_in_place(grad, weight, &row.a)?;
        }
        for (row, mu) in self.constraints.inequalities.iter().zip(self.mu) {
            // g = b - a·x ≤ 0 when satisfied
            let g = -row.residual(x)?;
            let p = mu.checked_add(self.rho.checked_mul(g)?)?.max(Decimal::ZERO);
            let term = p.checked_mul(p)?.checked_sub(mu.checked_mul(*mu)?)? / (dec!(2) * self.rho);
            *value = value.checked_add(term)?;
            axpy_in_place(grad, -p, &row.a)?;
        }
        Some(())
    }
}

/// A failed solve, with the iterate the outer loop stopped at when it got
/// that far.
#[derive(Debug)]
pub struct Unsolved {
    pub error: DiversifyError,
    pub last_iterate: Option<Vec<Decimal>>,
}

impl From<DiversifyError> for Unsolved {
    fn from(error: DiversifyError) -> Self {
        Unsolved {
            error,
            last_iterate: None,
        }
    }
}

/// Minimize `objective` from `x0` subject to `rows`.
///
/// `x0` must lie inside the objective's domain; it need not be feasible.
pub fn minimize<O: Objective>(
    objective: &O,
    x0: &[Decimal],
    rows: &[ConstraintRow],
    settings: &SolverSettings,
) -> DiversifyResult<Solution> {
    try_minimize(objective, x0, rows, settings).map_err(|unsolved| unsolved.error)
}

/// Same as [`minimize`], but a failure keeps the last outer iterate so the
/// caller can inspect where the solver got stuck.
pub fn try_minimize<O: Objective>(
    objective: &O,
    x0: &[Decimal],
    rows: &[ConstraintRow],
    settings: &SolverSettings,
) -> Result<Solution, Unsolved> {
    if settings.initial_penalty <= Decimal::ZERO || settings.max_penalty < settings.initial_penalty {
        return Err(DiversifyError::InvalidInput {
            field: "solver.initial_penalty".into(),
            reason: "Penalties must be positive with initial_penalty <= max_penalty".into(),
        }
        .into());
    }
    let started = Instant::now();
    let deadline = settings
        .time_limit_ms
        .map(|ms| started + Duration::from_millis(ms));

    let constraints = Normalized::from_rows(rows, x0.len())?;
    objective.evaluate(x0)?;

    let mut lambda = vec![Decimal::ZERO; constraints.equalities.len()];
    let mut mu = vec![Decimal::ZERO; constraints.inequalities.len()];
    let mut rho = settings.initial_penalty;
    let mut x = x0.to_vec();
    let mut prev_violation = constraints.max_violation(&x).ok_or_else(overflow)?;
    let mut inner_total = 0u32;
    let mut stagnant = 0u32;

    for outer in 1..=settings.max_iterations {
        let inner = {
            let augmented = Augmented {
                objective,
                constraints: &constraints,
                lambda: &lambda,
                mu: &mu,
                rho,
            };
            bfgs(&augmented, x, settings, deadline)?
        };
        inner_total += inner.iterations;
        x = inner.x;

        if inner.status == InnerStatus::TimedOut {
            return Err(Unsolved {
                error: DiversifyError::OptimizationFailed {
                    reason: format!(
                        "time limit of {} ms exceeded",
                        settings.time_limit_ms.unwrap_or_default()
                    ),
                    iterations: outer,
                },
                last_iterate: Some(x),
            });
        }

        let violation = constraints.max_violation(&x).ok_or_else(overflow)?;
        let mut complementarity = Decimal::ZERO;
        for (row, l) in constraints.equalities.iter().zip(lambda.iter_mut()) {
            let c = row.residual(&x).ok_or_else(overflow)?;
            *l = l.checked_add(rho.checked_mul(c).ok_or_else(overflow)?).ok_or_else(overflow)?;
        }
        for (row, m) in constraints.inequalities.iter().zip(mu.iter_mut()) {
            let slack = row.residual(&x).ok_or_else(overflow)?;
            let shifted = m.checked_sub(rho.checked_mul(slack).ok_or_else(overflow)?);
            *m = shifted.ok_or_else(overflow)?.max(Decimal::ZERO);
            complementarity = complementarity.max((*m).min(slack).abs());
        }

        debug!(
            outer,
            inner_iterations = inner.iterations,
            status = ?inner.status,
            violation = %violation,
            rho = %rho,
            "augmented lagrangian step"
        );

        if violation <= settings.feasibility_tolerance
            && complementarity <= settings.feasibility_tolerance
            && inner.status != InnerStatus::IterationLimit
        {
            let x = polish_equalities(objective, &constraints, x, settings.feasibility_tolerance);
            let (value, _) = objective.evaluate(&x)?;
            let max_violation = constraints.max_violation(&x).ok_or_else(overflow)?;
            return Ok(Solution {
                x,
                objective: value,
                outer_iterations: outer,
                inner_iterations: inner_total,
                max_violation,
            });
        }

        if violation > prev_violation * REQUIRED_PROGRESS {
            if rho >= settings.max_penalty {
                stagnant += 1;
                if stagnant >= STAGNATION_LIMIT {
                    return Err(Unsolved {
                        error: DiversifyError::OptimizationFailed {
                            reason: format!(
                                "constraints appear infeasible (violation {} at maximum penalty)",
                                violation.round_dp(12)
                            ),
                            iterations: outer,
                        },
                        last_iterate: Some(x),
                    });
                }
            }
            rho = (rho * PENALTY_GROWTH).min(settings.max_penalty);
        } else {
            stagnant = 0;
        }
        prev_violation = violation;
    }

    Err(Unsolved {
        error: DiversifyError::OptimizationFailed {
            reason: format!(
                "no feasible stationary point within the iteration budget (violation {})",
                prev_violation.round_dp(12)
            ),
            iterations: settings.max_iterations,
        },
        last_iterate: Some(x),
    })
}

/// Least-norm correction onto the equality rows, so they hold to working
/// precision. Kept only when it stays within tolerance on every row and
/// inside the objective's domain.
fn polish_equalities<O: Objective>(
    objective: &O,
    constraints: &Normalized,
    x: Vec<Decimal>,
    tolerance: Decimal,
) -> Vec<Decimal> {
    let polished = match project_onto_equalities(&constraints.equalities, &x) {
        Some(p) => p,
        None => return x,
    };
    let within = constraints
        .max_violation(&polished)
        .map(|v| v <= tolerance)
        .unwrap_or(false);
    if within && objective.evaluate(&polished).is_ok() {
        polished
    } else {
        x
    }
}

/// x − Aᵀ (A Aᵀ)⁻¹ (A x − b). `None` when the rows are linearly dependent.
fn project_onto_equalities(rows: &[Row], x: &[Decimal]) -> Option<Vec<Decimal>> {
    if rows.is_empty() {
        return Some(x.to_vec());
    }
    let gram: Vec<Vec<Decimal>> = rows
        .iter()
        .map(|ri| {
            rows.iter()
                .map(|rj| dot(&ri.a, &rj.a))
                .collect::<Option<Vec<Decimal>>>()
        })
        .collect::<Option<_>>()?;
    let residuals: Vec<Decimal> = rows.iter().map(|r| r.residual(x)).collect::<Option<_>>()?;
    let z = solve_linear_system(gram, residuals)?;
    let mut out = x.to_vec();
    for (row, zi) in rows.iter().zip(z.iter()) {
        axpy_in_place(&mut out, -*zi, &row.a)?;
    }
    Some(out)
}

/// Solve `m · z = rhs` by Gauss-Jordan elimination with partial pivoting.
#[allow(clippy::needless_range_loop)]
fn solve_linear_system(mut m: Vec<Vec<Decimal>>, mut rhs: Vec<Decimal>) -> Option<Vec<Decimal>> {
    let n = m.len();
    for col in 0..n {
        let mut max_row = col;
        let mut max_val = m[col][col].abs();
        for row in (col + 1)..n {
            let val = m[row][col].abs();
            if val > max_val {
                max_val = val;
                max_row = row;
            }
        }
        if max_val < PIVOT_TOLERANCE {
            return None;
        }
        if max_row != col {
            m.swap(col, max_row);
            rhs.swap(col, max_row);
        }

        let pivot = m[col][col];
        for cell in m[col].iter_mut() {
            *cell /= pivot;
        }
        rhs[col] /= pivot;

        let pivot_row = m[col].clone();
        let pivot_rhs = rhs[col];
        for row in 0..n {
            if row == col {
                continue;
            }
            let factor = m[row][col];
            for (cell, &pv) in m[row].iter_mut().zip(pivot_row.iter()) {
                *cell = cell.checked_sub(factor.checked_mul(pv)?)?;
            }
            rhs[row] = rhs[row].checked_sub(factor.checked_mul(pivot_rhs)?)?;
        }
    }
    Some(rhs)
}

// ---------------------------------------------------------------------------
// BFGS
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InnerStatus {
    Converged,
    /// No further decrease is representable; accepted as converged.
    Stalled,
    IterationLimit,
    TimedOut,
}

struct InnerResult {
    x: Vec<Decimal>,
    iterations: u32,
    status: InnerStatus,
}

fn bfgs<O: Objective>(
    f: &Augmented<'_, O>,
    x0: Vec<Decimal>,
    settings: &SolverSettings,
    deadline: Option<Instant>,
) -> DiversifyResult<InnerResult> {
    let n = x0.len();
    let done = |x: Vec<Decimal>, iterations: u32, status: InnerStatus| {
        Ok(InnerResult {
            x,
            iterations,
            status,
        })
    };

    let (mut fx, mut g) = match f.evaluate(&x0)? {
        Some(eval) => eval,
        None => return Err(overflow()),
    };
    let mut x = x0;
    let mut h = identity(n);
    let mut scaled = false;

    for k in 0..settings.max_inner_iterations {
        if norm_inf(&g) <= settings.tolerance {
            return done(x, k, InnerStatus::Converged);
        }
        if deadline.is_some_and(|d| Instant::now() >= d) {
            return done(x, k, InnerStatus::TimedOut);
        }

        let (d, slope) = match descent_direction(&h, &g) {
            Some(dir) => dir,
            None => {
                h = identity(n);
                let d: Vec<Decimal> = g.iter().map(|gi| -*gi).collect();
                let slope = -dot(&g, &g).ok_or_else(overflow)?;
                (d, slope)
            }
        };

        let mut alpha = Decimal::ONE;
        let mut accepted = None;
        for _ in 0..MAX_BACKTRACKS {
            if let Some(trial) = step(&x, alpha, &d) {
                if let Some((ft, gt)) = f.evaluate(&trial)? {
                    if ft <= fx + ARMIJO_C1 * alpha * slope {
                        accepted = Some((trial, ft, gt));
                        break;
                    }
                }
            }
            alpha /= dec!(2);
        }
        let (x_new, f_new, g_new) = match accepted {
            Some(a) => a,
            None => {
                trace!(iteration = k, "line search exhausted");
                return done(x, k, InnerStatus::Stalled);
            }
        };

        let s: Vec<Decimal> = x_new.iter().zip(x.iter()).map(|(a, b)| *a - *b).collect();
        let y: Vec<Decimal> = g_new.iter().zip(g.iter()).map(|(a, b)| *a - *b).collect();
        if let (Some(sy), Some(ss), Some(yy)) = (dot(&s, &y), dot(&s, &s), dot(&y, &y)) {
            let floor = (ss * yy).sqrt().unwrap_or(Decimal::ZERO) * CURVATURE_RATIO;
            if sy > floor && sy > MIN_CURVATURE {
                if !scaled && !yy.is_zero() {
                    h = identity(n);
                    let gamma = sy / yy;
                    for (i, row) in h.iter_mut().enumerate() {
                        row[i] = gamma;
                    }
                    scaled = true;
                }
                if bfgs_update(&mut h, &s, &y, sy).is_none() {
                    h = identity(n);
                }
            }
        }

        let decrease = fx - f_new;
        x = x_new;
        fx = f_new;
        g = g_new;

        if decrease <= STALL_RATIO * fx.abs().max(Decimal::ONE) {
            trace!(iteration = k, "objective no longer decreasing");
            return done(x, k + 1, InnerStatus::Stalled);
        }
    }

    if norm_inf(&g) <= settings.tolerance {
        return done(x, settings.max_inner_iterations, InnerStatus::Converged);
    }
    done(x, settings.max_inner_iterations, InnerStatus::IterationLimit)
}

/// `d = -H g` and its slope `g·d`, or `None` when it is not a descent
/// direction or overflows.
fn descent_direction(h: &[Vec<Decimal>], g: &[Decimal]) -> Option<(Vec<Decimal>, Decimal)> {
    let d: Vec<Decimal> = h
        .iter()
        .map(|row| dot(row, g).map(|v| -v))
        .collect::<Option<_>>()?;
    let slope = dot(g, &d)?;
    if slope < Decimal::ZERO {
        Some((d, slope))
    } else {
        None
    }
}

/// H ← H + ((sy + yᵀHy) / sy²) ssᵀ − (Hy sᵀ + s (Hy)ᵀ) / sy
#[allow(clippy::needless_range_loop)]
fn bfgs_update(h: &mut [Vec<Decimal>], s: &[Decimal], y: &[Decimal], sy: Decimal) -> Option<()> {
    let n = s.len();
    let hy: Vec<Decimal> = h.iter().map(|row| dot(row, y)).collect::<Option<_>>()?;
    let yhy = dot(y, &hy)?;
    let outer_coef = sy.checked_add(yhy)?.checked_div(sy)?.checked_div(sy)?;
    for i in 0..n {
        for j in 0..n {
            let ss = outer_coef.checked_mul(s[i])?.checked_mul(s[j])?;
            let cross = hy[i]
                .checked_mul(s[j])?
                .checked_add(s[i].checked_mul(hy[j])?)?
                .checked_div(sy)?;
            h[i][j] = h[i][j].checked_add(ss)?.checked_sub(cross)?;
        }
    }
    Some(())
}

// ---------------------------------------------------------------------------
// Vector helpers
// ---------------------------------------------------------------------------

fn identity(n: usize) -> Vec<Vec<Decimal>> {
    (0..n)
        .map(|i| {
            let mut row = vec![Decimal::ZERO; n];
            row[i] = Decimal::ONE;
            row
        })
        .collect()
}

/// Overflow-checked dot product.
fn dot(a: &[Decimal], b: &[Decimal]) -> Option<Decimal> {
    a.iter()
        .zip(b.iter())
        .try_fold(Decimal::ZERO, |acc, (x, y)| acc.checked_add(x.checked_mul(*y)?))
}

/// `y += alpha · x`
fn axpy_in_place(y: &mut [Decimal], alpha: Decimal, x: &[Decimal]) -> Option<()> {
    for (yi, xi) in y.iter_mut().zip(x.iter()) {
        *yi = yi.checked_add(alpha.checked_mul(*xi)?)?;
    }
    Some(())
}

/// `x + alpha · d`
fn step(x: &[Decimal], alpha: Decimal, d: &[Decimal]) -> Option<Vec<Decimal>> {
    let mut out = x.to_vec();
    axpy_in_place(&mut out, alpha, d)?;
    Some(out)
}

fn norm_inf(v: &[Decimal]) -> Decimal {
    v.iter().map(|x| x.abs()).max().unwrap_or(Decimal::ZERO)
}

fn overflow() -> DiversifyError {
    DiversifyError::OptimizationFailed {
        reason: "numeric overflow while solving".into(),
        iterations: 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Σ (x_i − c_i)², defined everywhere.
    struct Quadratic {
        center: Vec<Decimal>,
    }

    impl Objective for Quadratic {
        fn evaluate(&self, x: &[Decimal]) -> DiversifyResult<(Decimal, Vec<Decimal>)> {
            let diff: Vec<Decimal> = x.iter().zip(&self.center).map(|(a, c)| *a - *c).collect();
            let value: Decimal = diff.iter().map(|d| *d * *d).sum();
            let grad: Vec<Decimal> = diff.iter().map(|d| dec!(2) * *d).collect();
            Ok((value, grad))
        }
    }

    /// Quadratic that is only defined for x_0 > 0.
    struct PositiveFirst(Quadratic);

    impl Objective for PositiveFirst {
        fn evaluate(&self, x: &[Decimal]) -> DiversifyResult<(Decimal, Vec<Decimal>)> {
            if x[0] <= Decimal::ZERO {
                return Err(DiversifyError::DegenerateDenominator {
                    context: "test".into(),
                });
            }
            self.0.evaluate(x)
        }
    }

    fn row(coefficients: &[Decimal], bound: Bound) -> ConstraintRow {
        ConstraintRow {
            label: "test".into(),
            coefficients: coefficients.to_vec(),
            bound,
        }
    }

    fn near(a: Decimal, b: Decimal) -> bool {
        (a - b).abs() < dec!(0.000001)
    }

    #[test]
    fn test_unconstrained_minimum() {
        let f = Quadratic {
            center: vec![dec!(1), dec!(-2), dec!(0.5)],
        };
        let sol = minimize(&f, &[dec!(0); 3], &[], &SolverSettings::default()).unwrap();
        assert!(near(sol.x[0], dec!(1)));
        assert!(near(sol.x[1], dec!(-2)));
        assert!(near(sol.x[2], dec!(0.5)));
        assert!(sol.objective < dec!(0.000001));
    }

    #[test]
    fn test_equality_constraint() {
        // min (x-1)² + (y-1)² s.t. x + y = 1  →  (0.5, 0.5)
        let f = Quadratic {
            center: vec![dec!(1), dec!(1)],
        };
        let rows = vec![row(&[dec!(1), dec!(1)], Bound::Equal(dec!(1)))];
        let sol = minimize(&f, &[dec!(0); 2], &rows, &SolverSettings::default()).unwrap();
        assert!(near(sol.x[0], dec!(0.5)));
        assert!(near(sol.x[1], dec!(0.5)));
        assert!(sol.max_violation <= dec!(0.000000001));
    }

    #[test]
    fn test_active_inequality() {
        // min (x-2)² s.t. x ≤ 1  →  1
        let f = Quadratic {
            center: vec![dec!(2)],
        };
        let rows = vec![row(&[dec!(1)], Bound::AtMost(dec!(1)))];
        let sol = minimize(&f, &[dec!(0)], &rows, &SolverSettings::default()).unwrap();
        assert!(near(sol.x[0], dec!(1)));
    }

    #[test]
    fn test_inactive_inequality() {
        let f = Quadratic {
            center: vec![dec!(2)],
        };
        let rows = vec![row(&[dec!(1)], Bound::AtLeast(dec!(-5)))];
        let sol = minimize(&f, &[dec!(0)], &rows, &SolverSettings::default()).unwrap();
        assert!(near(sol.x[0], dec!(2)));
    }

    #[test]
    fn test_infeasible_constraints() {
        let f = Quadratic {
            center: vec![dec!(0)],
        };
        let rows = vec![
            row(&[dec!(1)], Bound::AtLeast(dec!(2))),
            row(&[dec!(1)], Bound::AtMost(dec!(1))),
        ];
        match minimize(&f, &[dec!(0)], &rows, &SolverSettings::default()) {
            Err(DiversifyError::OptimizationFailed { .. }) => {}
            other => panic!("expected OptimizationFailed, got {:?}", other.map(|s| s.x)),
        }
    }

    #[test]
    fn test_zero_row_that_cannot_hold() {
        let f = Quadratic {
            center: vec![dec!(0)],
        };
        let rows = vec![row(&[dec!(0)], Bound::Equal(dec!(3)))];
        match minimize(&f, &[dec!(0)], &rows, &SolverSettings::default()) {
            Err(DiversifyError::OptimizationFailed { iterations, .. }) => assert_eq!(iterations, 0),
            other => panic!("expected OptimizationFailed, got {:?}", other.map(|s| s.x)),
        }
    }

    #[test]
    fn test_domain_is_respected() {
        // unconstrained minimum at x_0 = -1 lies outside the domain
        let f = PositiveFirst(Quadratic {
            center: vec![dec!(-1)],
        });
        let rows = vec![row(&[dec!(1)], Bound::AtLeast(dec!(0.5)))];
        let sol = minimize(&f, &[dec!(2)], &rows, &SolverSettings::default()).unwrap();
        assert!(near(sol.x[0], dec!(0.5)));
    }

    #[test]
    fn test_start_outside_domain_fails() {
        let f = PositiveFirst(Quadratic {
            center: vec![dec!(1)],
        });
        assert!(matches!(
            minimize(&f, &[dec!(0)], &[], &SolverSettings::default()),
            Err(DiversifyError::DegenerateDenominator { .. })
        ));
    }

    #[test]
    fn test_iteration_budget_exhausted() {
        let f = Quadratic {
            center: vec![dec!(3), dec!(3)],
        };
        let rows = vec![row(&[dec!(1), dec!(1)], Bound::Equal(dec!(0)))];
        let settings = SolverSettings {
            max_iterations: 1,
            ..SolverSettings::default()
        };
        assert!(matches!(
            minimize(&f, &[dec!(0); 2], &rows, &settings),
            Err(DiversifyError::OptimizationFailed { iterations: 1, .. })
        ));
    }

    #[test]
    fn test_dependent_equalities_still_solve() {
        let f = Quadratic {
            center: vec![dec!(2), dec!(0)],
        };
        let rows = vec![
            row(&[dec!(1), dec!(1)], Bound::Equal(dec!(1))),
            row(&[dec!(2), dec!(2)], Bound::Equal(dec!(2))),
        ];
        let sol = minimize(&f, &[dec!(0); 2], &rows, &SolverSettings::default()).unwrap();
        assert!(near(sol.x[0], dec!(1.5)));
        assert!(near(sol.x[1], dec!(-0.5)));
    }

    #[test]
    fn test_time_limit_is_enforced() {
        let f = Quadratic {
            center: vec![dec!(3), dec!(3)],
        };
        let settings = SolverSettings {
            time_limit_ms: Some(0),
            ..SolverSettings::default()
        };
        match minimize(&f, &[dec!(0); 2], &[], &settings) {
            Err(DiversifyError::OptimizationFailed { reason, iterations }) => {
                assert!(reason.contains("time limit"), "reason: {}", reason);
                assert_eq!(iterations, 1);
            }
            other => panic!("expected OptimizationFailed, got {:?}", other.map(|s| s.x)),
        }
    }

    #[test]
    fn test_failure_keeps_last_iterate() {
        let f = Quadratic {
            center: vec![dec!(0)],
        };
        let rows = vec![
            row(&[dec!(1)], Bound::AtLeast(dec!(2))),
            row(&[dec!(1)], Bound::AtMost(dec!(1))),
        ];
        let unsolved = try_minimize(&f, &[dec!(0)], &rows, &SolverSettings::default()).unwrap_err();
        assert!(matches!(unsolved.error, DiversifyError::OptimizationFailed { .. }));
        assert_eq!(unsolved.last_iterate.map(|x| x.len()), Some(1));

        let outside = PositiveFirst(Quadratic {
            center: vec![dec!(1)],
        });
        let unsolved = try_minimize(&outside, &[dec!(0)], &[], &SolverSettings::default()).unwrap_err();
        assert!(unsolved.last_iterate.is_none());
    }

    #[test]
    fn test_bad_penalty_settings_rejected() {
        let f = Quadratic {
            center: vec![dec!(0)],
        };
        let settings = SolverSettings {
            initial_penalty: dec!(0),
            ..SolverSettings::default()
        };
        assert!(matches!(
            minimize(&f, &[dec!(0)], &[], &settings),
            Err(DiversifyError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_solve_linear_system() {
        let m = vec![vec![dec!(2), dec!(1)], vec![dec!(1), dec!(3)]];
        let z = solve_linear_system(m, vec![dec!(3), dec!(5)]).unwrap();
        assert!(near(z[0], dec!(0.8)));
        assert!(near(z[1], dec!(1.4)));
        let singular = vec![vec![dec!(1), dec!(2)], vec![dec!(2), dec!(4)]];
        assert!(solve_linear_system(singular, vec![dec!(1), dec!(2)]).is_none());
    }
}
