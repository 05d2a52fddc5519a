//! IRR by Newton-Raphson iteration on the NPV function

use super::{Convergence, IrrSolution, IrrSolver, DEFAULT_INITIAL_RATE, DEFAULT_MAX_ITERATIONS, DEFAULT_TOLERANCE};
use crate::cashflows;
use crate::error::{IrrError, IrrResult};
use crate::valuation::npv;
use serde::{Deserialize, Serialize};

/// Estimates larger than this in magnitude count as divergence. Far out the
/// discounted terms underflow and the slope reads as exactly zero, which is
/// not a genuine stationary point.
pub const DIVERGENCE_BOUND: f64 = 1e10;

/// Newton-Raphson root finder using the analytic NPV derivative.
///
/// Iterates `rate - npv(rate) / npv'(rate)` until either |NPV| or the step
/// size drops below `tolerance`. Estimates are not clamped: a step that lands
/// at or below -100% or beyond [`DIVERGENCE_BOUND`] ends the solve with
/// [`IrrError::Diverged`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NewtonRaphson {
    pub initial_rate: f64,
    pub tolerance: f64,
    pub max_iterations: u32,
}

impl Default for NewtonRaphson {
    fn default() -> Self {
        Self {
            initial_rate: DEFAULT_INITIAL_RATE,
            tolerance: DEFAULT_TOLERANCE,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

impl NewtonRaphson {
    /// Newton-Raphson from `initial_rate` with default tolerance and cap
    pub fn new(initial_rate: f64) -> Self {
        Self {
            initial_rate,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    #[must_use]
    pub fn with_max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    fn validate(&self) -> IrrResult<()> {
        npv::check_rate(self.initial_rate)?;
        if !self.initial_rate.is_finite() {
            return Err(IrrError::invalid_config(format!(
                "initial rate must be finite, got {}",
                self.initial_rate
            )));
        }
        if !(self.tolerance > 0.0) {
            return Err(IrrError::invalid_config(format!("tolerance must be positive, got {}", self.tolerance)));
        }
        if self.max_iterations == 0 {
            return Err(IrrError::invalid_config("max_iterations must be at least 1"));
        }
        Ok(())
    }
}

impl IrrSolver for NewtonRaphson {
    fn solve(&self, cashflows: &[f64]) -> IrrResult<IrrSolution> {
        cashflows::validate(cashflows)?;
        self.validate()?;

        let mut rate = self.initial_rate;

        for iteration in 0..self.max_iterations {
            // Any evaluator failure after the first step means the estimate
            // walked out of the domain
            let (value, slope) = match npv::npv_and_derivative(cashflows, rate) {
                Ok(pair) => pair,
                Err(_) => return Err(IrrError::Diverged { rate, iteration }),
            };
            if !value.is_finite() || !slope.is_finite() {
                return Err(IrrError::Diverged { rate, iteration });
            }

            if value.abs() < self.tolerance {
                log::debug!("newton converged to {} after {} iterations (residual)", rate, iteration);
                return Ok(IrrSolution {
                    rate,
                    iterations: iteration,
                    residual: value,
                    convergence: Convergence::Residual,
                });
            }

            if slope == 0.0 {
                return Err(IrrError::ZeroDerivative { rate, iteration });
            }

            let next = rate - value / slope;
            log::trace!(
                "newton {}: rate = {:.10}, npv = {:.6e}, slope = {:.6e}, next = {:.10}",
                iteration,
                rate,
                value,
                slope,
                next
            );

            if !next.is_finite() || next.abs() > DIVERGENCE_BOUND {
                return Err(IrrError::Diverged { rate: next, iteration: iteration + 1 });
            }

            if (next - rate).abs() < self.tolerance {
                // a converged estimate must still be a valid rate
                let residual = npv::npv(cashflows, next).map_err(|_| IrrError::Diverged {
                    rate: next,
                    iteration: iteration + 1,
                })?;
                log::debug!("newton converged to {} after {} iterations (step size)", next, iteration + 1);
                return Ok(IrrSolution {
                    rate: next,
                    iterations: iteration + 1,
                    residual,
                    convergence: Convergence::StepSize,
                });
            }

            rate = next;
        }

        Err(IrrError::IterationLimitExceeded {
            method: self.name(),
            iterations: self.max_iterations,
        })
    }

    fn name(&self) -> &'static str {
        "Newton-Raphson"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::irr::Bisection;
    use approx::assert_relative_eq;

    #[test]
    fn test_two_period_exact() {
        let solution = NewtonRaphson::default().solve(&[-1000.0, 1200.0]).unwrap();
        assert_relative_eq!(solution.rate, 0.20, epsilon = 1e-8);
        assert!(solution.iterations < 10);
    }

    #[test]
    fn test_guess_at_root_returns_immediately() {
        let solution = NewtonRaphson::new(0.5).solve(&[-100.0, 150.0]).unwrap();
        assert_eq!(solution.rate, 0.5);
        assert_eq!(solution.iterations, 0);
        assert_eq!(solution.convergence, Convergence::Residual);
    }

    #[test]
    fn test_agrees_with_bisection() {
        let cashflows = [-1000.0, 300.0, 700.0, 100.0, 400.0];
        let newton = NewtonRaphson::new(0.193).solve(&cashflows).unwrap();
        let bisection = Bisection::default().solve(&cashflows).unwrap();
        assert!(newton.rate > 0.19 && newton.rate < 0.193, "got {}", newton.rate);
        assert_relative_eq!(newton.rate, bisection.rate, epsilon = 1e-4);
    }

    #[test]
    fn test_zero_derivative() {
        // Only the undiscounted flow is non-zero, so NPV is flat in the rate
        let err = NewtonRaphson::default().solve(&[1000.0, 0.0, 0.0]).unwrap_err();
        assert_eq!(err, IrrError::ZeroDerivative { rate: 0.1, iteration: 0 });
    }

    #[test]
    fn test_step_below_minus_one_diverges() {
        // First step from 10% lands near -150%
        let err = NewtonRaphson::default().solve(&[100.0, 100.0, -100.0]).unwrap_err();
        match err {
            IrrError::Diverged { rate, iteration } => {
                assert!(rate <= -1.0);
                assert_eq!(iteration, 1);
            }
            other => panic!("Expected Diverged, got {:?}", other),
        }
    }

    #[test]
    fn test_one_signed_flows_diverge() {
        // Each step roughly squares the rate; the slope would underflow to
        // zero long before the iteration cap
        let err = NewtonRaphson::default().solve(&[100.0, 100.0, 100.0]).unwrap_err();
        match err {
            IrrError::Diverged { rate, iteration } => {
                assert!(rate > DIVERGENCE_BOUND);
                assert!(iteration < 20, "took {} iterations", iteration);
            }
            other => panic!("Expected Diverged, got {:?}", other),
        }
    }

    #[test]
    fn test_long_series_from_pole_diverges() {
        // NPV at the starting rate is too large for an f64
        let mut cashflows = vec![-1000.0];
        cashflows.extend(std::iter::repeat(0.0).take(90));
        cashflows.push(2000.0);
        assert_eq!(
            NewtonRaphson::new(-0.9999).solve(&cashflows),
            Err(IrrError::Diverged { rate: -0.9999, iteration: 0 })
        );

        let solution = NewtonRaphson::new(0.0).solve(&cashflows).unwrap();
        assert_relative_eq!(solution.rate, 2.0_f64.powf(1.0 / 91.0) - 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_iteration_limit() {
        let err = NewtonRaphson::default()
            .with_max_iterations(1)
            .solve(&[-1000.0, 300.0, 700.0, -100.0, 400.0])
            .unwrap_err();
        assert_eq!(
            err,
            IrrError::IterationLimitExceeded {
                method: "Newton-Raphson",
                iterations: 1
            }
        );
    }

    #[test]
    fn test_invalid_initial_rate() {
        let cashflows = [-100.0, 110.0];
        assert_eq!(
            NewtonRaphson::new(-1.0).solve(&cashflows),
            Err(IrrError::Domain { rate: -1.0 })
        );
        assert!(matches!(
            NewtonRaphson::new(f64::INFINITY).solve(&cashflows),
            Err(IrrError::InvalidConfig { .. })
        ));
        assert!(matches!(
            NewtonRaphson::default().with_tolerance(-1.0).solve(&cashflows),
            Err(IrrError::InvalidConfig { .. })
        ));
    }
}
