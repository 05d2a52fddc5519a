//! IRR by bisection over a fixed rate interval

use super::{Convergence, IrrSolution, IrrSolver, DEFAULT_HIGH, DEFAULT_LOW, DEFAULT_MAX_ITERATIONS, DEFAULT_TOLERANCE};
use crate::cashflows;
use crate::error::{IrrError, IrrResult};
use crate::valuation::npv;
use serde::{Deserialize, Serialize};

/// Bisection root finder on `[low, high]`.
///
/// The interval is never widened: if NPV has the same sign at both ends the
/// solve fails with [`IrrError::NotBracketed`]. Both bracket orientations
/// are accepted. For an ordinary investment (outlay first) NPV is positive
/// at `low` and negative at `high`, and a positive midpoint NPV moves `low`
/// up; for financing-style flows the roles are swapped.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bisection {
    pub low: f64,
    pub high: f64,
    pub tolerance: f64,
    pub max_iterations: u32,
}

impl Default for Bisection {
    fn default() -> Self {
        Self {
            low: DEFAULT_LOW,
            high: DEFAULT_HIGH,
            tolerance: DEFAULT_TOLERANCE,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

impl Bisection {
    /// Bisection on `[low, high]` with default tolerance and iteration cap
    pub fn new(low: f64, high: f64) -> Self {
        Self {
            low,
            high,
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
        npv::check_rate(self.low)?;
        if !(self.low < self.high) || !self.high.is_finite() {
            return Err(IrrError::invalid_config(format!(
                "bisection needs low < high, got [{}, {}]",
                self.low, self.high
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

impl IrrSolver for Bisection {
    fn solve(&self, cashflows: &[f64]) -> IrrResult<IrrSolution> {
        cashflows::validate(cashflows)?;
        self.validate()?;

        let mut low = self.low;
        let mut high = self.high;
        let (exact_low, npv_low) = evaluate(cashflows, low)?;
        let (exact_high, npv_high) = evaluate(cashflows, high)?;

        // Compare signs rather than multiplying: the endpoint values can be
        // huge near the -100% pole and the product would overflow
        let same_sign = (npv_low > 0.0 && npv_high > 0.0) || (npv_low < 0.0 && npv_high < 0.0);
        if same_sign || npv_low.is_nan() || npv_high.is_nan() {
            return Err(IrrError::NotBracketed {
                low,
                high,
                npv_low,
                npv_high,
            });
        }

        for (rate, exact) in [(low, exact_low), (high, exact_high)] {
            if let Some(value) = exact.filter(|value| value.abs() < self.tolerance) {
                return Ok(IrrSolution {
                    rate,
                    iterations: 0,
                    residual: value,
                    convergence: Convergence::Residual,
                });
            }
        }

        // true for the ordinary orientation: npv(low) > 0 > npv(high)
        let positive_at_low = npv_low > 0.0;

        for iteration in 1..=self.max_iterations {
            let mid = (low + high) / 2.0;
            let (exact_mid, npv_mid) = evaluate(cashflows, mid)?;

            log::trace!("bisection {}: [{:.10}, {:.10}] mid = {:.10}, npv = {:.6e}", iteration, low, high, mid, npv_mid);

            if let Some(value) = exact_mid.filter(|value| value.abs() < self.tolerance) {
                log::debug!("bisection converged to {} after {} iterations", mid, iteration);
                return Ok(IrrSolution {
                    rate: mid,
                    iterations: iteration,
                    residual: value,
                    convergence: Convergence::Residual,
                });
            }

            if (npv_mid > 0.0) == positive_at_low {
                low = mid;
            } else {
                high = mid;
            }
        }

        Err(IrrError::IterationLimitExceeded {
            method: self.name(),
            iterations: self.max_iterations,
        })
    }

    fn name(&self) -> &'static str {
        "Bisection"
    }
}

/// NPV at `rate` when it fits in an f64, paired with a finite value of the
/// same sign that is always available for steering the bracket
fn evaluate(cashflows: &[f64], rate: f64) -> IrrResult<(Option<f64>, f64)> {
    match npv::npv(cashflows, rate) {
        Ok(value) => Ok((Some(value), value)),
        Err(IrrError::Overflow { .. }) => Ok((None, npv::scaled_npv(cashflows, rate)?)),
        Err(e) => Err(e),
    }
}
