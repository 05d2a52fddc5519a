//! Cash-flow series and the ways of getting one (text, CSV)

mod parse;
pub mod loader;

pub use parse::{parse_cash_flows, parse_rate};
pub use loader::{load_series, load_series_from_reader, NamedSeries};

use crate::error::{IrrError, IrrResult};
use serde::{Deserialize, Serialize};
use std::ops::Deref;

/// Minimum number of periods for NPV/IRR to be meaningful
pub const MIN_PERIODS: usize = 2;

/// Ordered periodic cash flows, index 0 = today (usually the negative outlay).
///
/// Always holds at least two finite values. Derefs to `[f64]` so it can be
/// passed anywhere a plain slice is accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct CashFlowSeries {
    flows: Vec<f64>,
}

impl CashFlowSeries {
    /// Validate and wrap a vector of cash flows
    pub fn new(flows: Vec<f64>) -> IrrResult<Self> {
        validate(&flows)?;
        Ok(Self { flows })
    }

    /// Build a series from an initial investment (entered as a positive
    /// outlay) followed by the flows of periods 1..=n
    pub fn from_initial_investment(initial_investment: f64, flows: &[f64]) -> IrrResult<Self> {
        let mut all = Vec::with_capacity(flows.len() + 1);
        all.push(-initial_investment);
        all.extend_from_slice(flows);
        Self::new(all)
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.flows
    }

    pub fn into_inner(self) -> Vec<f64> {
        self.flows
    }

    /// Number of sign changes between consecutive non-zero flows.
    ///
    /// Zero means no IRR exists; more than one means there may be several.
    pub fn sign_changes(&self) -> usize {
        let mut previous: Option<bool> = None;
        let mut changes = 0;
        for &cf in self.flows.iter().filter(|cf| **cf != 0.0) {
            let positive = cf > 0.0;
            if let Some(prev) = previous {
                if prev != positive {
                    changes += 1;
                }
            }
            previous = Some(positive);
        }
        changes
    }

    /// Plain sum of all flows (the NPV at a zero rate)
    pub fn undiscounted_total(&self) -> f64 {
        self.flows.iter().sum()
    }
}

/// Check the series invariants without taking ownership
pub fn validate(flows: &[f64]) -> IrrResult<()> {
    if flows.len() < MIN_PERIODS {
        return Err(IrrError::invalid_cash_flows(format!(
            "need at least {} values, got {}",
            MIN_PERIODS,
            flows.len()
        )));
    }
    if let Some((period, cf)) = flows.iter().enumerate().find(|(_, cf)| !cf.is_finite()) {
        return Err(IrrError::invalid_cash_flows(format!(
            "value {} at period {} is not finite",
            cf, period
        )));
    }
    Ok(())
}

impl Deref for CashFlowSeries {
    type Target = [f64];

    fn deref(&self) -> &[f64] {
        &self.flows
    }
}

impl AsRef<[f64]> for CashFlowSeries {
    fn as_ref(&self) -> &[f64] {
        &self.flows
    }
}

impl TryFrom<Vec<f64>> for CashFlowSeries {
    type Error = IrrError;

    fn try_from(flows: Vec<f64>) -> IrrResult<Self> {
        Self::new(flows)
    }
}

impl TryFrom<&[f64]> for CashFlowSeries {
    type Error = IrrError;

    fn try_from(flows: &[f64]) -> IrrResult<Self> {
        Self::new(flows.to_vec())
    }
}

impl From<CashFlowSeries> for Vec<f64> {
    fn from(series: CashFlowSeries) -> Self {
        series.flows
    }
}
