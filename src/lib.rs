//! NPV/IRR - net present value and internal rate of return for periodic cash flows
//!
//! This library provides:
//! - NPV and its analytic rate derivative
//! - IRR by bisection and by Newton-Raphson, behind a common solver trait
//! - Typed failures for every way a solve can go wrong (no sentinel rates)
//! - NPV curves over a rate range, cash-flow parsing and CSV loading
//! - Option payoff at expiry

pub mod cashflows;
pub mod config;
pub mod error;
pub mod irr;
pub mod payoff;
pub mod valuation;

// Re-export commonly used types
pub use cashflows::CashFlowSeries;
pub use config::SolverSettings;
pub use error::{IrrError, IrrResult, LoadError};
pub use irr::{irr, irr_bisection, irr_newton_raphson, Bisection, IrrSolution, IrrSolver, NewtonRaphson};
pub use valuation::{npv, npv_derivative, NpvCurve};
