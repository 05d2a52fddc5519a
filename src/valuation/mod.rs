//! Present-value calculations

pub mod npv;
mod curve;

pub use npv::{npv, npv_and_derivative, npv_derivative, npv_with_initial_investment, scaled_npv};
pub use curve::{rate_grid, CurveComparison, NpvCurve, DEFAULT_RATE_MAX, DEFAULT_RATE_MIN, DEFAULT_STEPS};
