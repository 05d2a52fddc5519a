//! Error types for NPV evaluation and IRR solving

use thiserror::Error;

/// Result alias used throughout the valuation and solver modules
pub type IrrResult<T> = Result<T, IrrError>;

/// Failures surfaced by the NPV evaluator and the IRR solvers.
///
/// Every variant is terminal for the call that produced it: nothing is
/// retried internally and no sentinel rate is ever returned in its place.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IrrError {
    /// Discount rate outside (-1, +inf)
    #[error("Rate {rate} is outside the valid domain (rate must be > -1)")]
    Domain { rate: f64 },

    /// NPV or its derivative at `rate` exceeds the f64 range, which happens
    /// for long series evaluated close to -100%
    #[error("NPV at rate {rate} is not representable as a finite number")]
    Overflow { rate: f64 },

    /// Bisection endpoints do not bracket a sign change
    #[error("IRR not bracketed in [{low}, {high}]: npv(low) = {npv_low:.6e}, npv(high) = {npv_high:.6e}")]
    NotBracketed {
        low: f64,
        high: f64,
        npv_low: f64,
        npv_high: f64,
    },

    /// Newton-Raphson reached a stationary point of NPV
    #[error("Derivative is zero at rate {rate} (iteration {iteration}), no Newton step possible")]
    ZeroDerivative { rate: f64, iteration: u32 },

    /// Solver used its whole iteration budget without converging
    #[error("{method} did not converge within {iterations} iterations")]
    IterationLimitExceeded { method: &'static str, iterations: u32 },

    /// Newton-Raphson estimate left the valid rate domain or became non-finite
    #[error("Newton-Raphson diverged: rate {rate} at iteration {iteration}")]
    Diverged { rate: f64, iteration: u32 },

    #[error("Invalid cash flows: {reason}")]
    InvalidCashFlows { reason: String },

    #[error("Invalid solver configuration: {reason}")]
    InvalidConfig { reason: String },
}

impl IrrError {
    pub fn invalid_cash_flows(reason: impl Into<String>) -> Self {
        Self::InvalidCashFlows {
            reason: reason.into(),
        }
    }

    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }
}

/// Failures while reading cash flows or rates from text and files
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Could not parse '{value}' as a number on line {line}")]
    Number { value: String, line: u64 },

    #[error("Format error: {0}")]
    Format(String),

    #[error(transparent)]
    Series(#[from] IrrError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = IrrError::IterationLimitExceeded {
            method: "Bisection",
            iterations: 1000,
        };
        assert!(err.to_string().contains("1000 iterations"));

        let err = IrrError::Domain { rate: -1.5 };
        assert!(err.to_string().contains("-1.5"));

        let err = IrrError::Overflow { rate: -0.9999 };
        assert!(err.to_string().contains("not representable"));
    }

    #[test]
    fn test_series_error_wraps_transparently() {
        let err: LoadError = IrrError::invalid_cash_flows("need at least 2 values").into();
        assert_eq!(err.to_string(), "Invalid cash flows: need at least 2 values");
    }
}
