//! Internal Rate of Return (IRR) solvers
//!
//! Two interchangeable root finders over the NPV function:
//! - [`Bisection`]: needs a bracketing interval, always converges inside it
//! - [`NewtonRaphson`]: needs a starting guess, uses the analytic derivative
//!
//! [`NewtonWithFallback`] runs Newton-Raphson first and falls back to
//! bisection when it fails, which is what [`irr`] uses.

mod bisection;
mod newton;

pub use bisection::Bisection;
pub use newton::{NewtonRaphson, DIVERGENCE_BOUND};
pub use crate::config::SolverSettings;

use crate::error::{IrrError, IrrResult};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Lower end of the default bisection interval (just inside the -100% pole)
pub const DEFAULT_LOW: f64 = -0.9999;
/// Upper end of the default bisection interval
pub const DEFAULT_HIGH: f64 = 1.0;
/// Default starting guess for Newton-Raphson
pub const DEFAULT_INITIAL_RATE: f64 = 0.1;
/// Default convergence tolerance on |NPV| (and on step size for Newton)
pub const DEFAULT_TOLERANCE: f64 = 1e-6;
pub const DEFAULT_MAX_ITERATIONS: u32 = 1000;

/// Which test ended the iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Convergence {
    /// |NPV| fell below the tolerance
    Residual,
    /// Successive Newton estimates moved by less than the tolerance
    StepSize,
}

/// A converged IRR and how it was reached
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IrrSolution {
    /// Per-period rate (0.15 = 15%)
    pub rate: f64,
    pub iterations: u32,
    /// NPV at `rate`
    pub residual: f64,
    pub convergence: Convergence,
}

/// Common interface for the IRR root finders
pub trait IrrSolver: Send + Sync {
    /// Find a rate at which the NPV of `cashflows` is (numerically) zero
    fn solve(&self, cashflows: &[f64]) -> IrrResult<IrrSolution>;

    fn name(&self) -> &'static str;
}

/// Newton-Raphson from a guess, then bisection if Newton fails for any
/// reason other than bad input
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct NewtonWithFallback {
    pub newton: NewtonRaphson,
    pub bisection: Bisection,
}

impl IrrSolver for NewtonWithFallback {
    fn solve(&self, cashflows: &[f64]) -> IrrResult<IrrSolution> {
        match self.newton.solve(cashflows) {
            Ok(solution) => Ok(solution),
            Err(e @ (IrrError::InvalidCashFlows { .. } | IrrError::InvalidConfig { .. } | IrrError::Domain { .. })) => Err(e),
            Err(e) => {
                log::warn!("{} failed ({}), falling back to {}", self.newton.name(), e, self.bisection.name());
                self.bisection.solve(cashflows)
            }
        }
    }

    fn name(&self) -> &'static str {
        "Newton-Raphson with bisection fallback"
    }
}

/// IRR by bisection over the default interval [-0.9999, 1.0]
pub fn irr_bisection(cashflows: &[f64]) -> IrrResult<f64> {
    Bisection::default().solve(cashflows).map(|s| s.rate)
}

/// IRR by Newton-Raphson from the default guess of 10%
pub fn irr_newton_raphson(cashflows: &[f64]) -> IrrResult<f64> {
    NewtonRaphson::default().solve(cashflows).map(|s| s.rate)
}

/// IRR with default settings: Newton-Raphson, falling back to bisection
///
/// # Example
/// ```
/// use npv_irr::irr;
///
/// let rate = irr(&[-100.0, 110.0]).unwrap();
/// assert!((rate - 0.10).abs() < 1e-6);
/// ```
pub fn irr(cashflows: &[f64]) -> IrrResult<f64> {
    irr_with(cashflows, &SolverSettings::default()).map(|s| s.rate)
}

/// IRR with explicit settings: Newton-Raphson, falling back to bisection
pub fn irr_with(cashflows: &[f64], settings: &SolverSettings) -> IrrResult<IrrSolution> {
    settings.fallback().solve(cashflows)
}

/// Solve many independent series in parallel.
///
/// Output order matches input order, and each entry is exactly what a
/// sequential `solver.solve` call would return.
pub fn solve_batch<S, T>(solver: &S, all: &[T]) -> Vec<IrrResult<IrrSolution>>
where
    S: IrrSolver + ?Sized,
    T: AsRef<[f64]> + Sync,
{
    all.par_iter().map(|cashflows| solver.solve(cashflows.as_ref())).collect()
}
