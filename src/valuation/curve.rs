//! NPV-versus-rate curves (the data behind an NPV profile chart)

use super::npv;
use crate::cashflows::CashFlowSeries;
use crate::error::{IrrError, IrrResult};
use crate::irr::{irr_with, SolverSettings};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::io::Write;

pub const DEFAULT_RATE_MIN: f64 = -0.5;
pub const DEFAULT_RATE_MAX: f64 = 0.5;
pub const DEFAULT_STEPS: usize = 100;

/// NPV sampled over evenly spaced rates, plus the IRR if one was found
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NpvCurve {
    pub rates: Vec<f64>,
    pub npvs: Vec<f64>,
    pub irr: Option<f64>,
}

/// A primary curve and an optional comparison curve on the same rate grid
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurveComparison {
    pub primary: NpvCurve,
    pub compare: Option<NpvCurve>,
}

/// `steps` evenly spaced points from `min` to `max`, both ends included
pub fn rate_grid(min: f64, max: f64, steps: usize) -> IrrResult<Vec<f64>> {
    if steps < 2 {
        return Err(IrrError::invalid_config(format!("curve needs at least 2 steps, got {}", steps)));
    }
    if !(min < max) {
        return Err(IrrError::invalid_config(format!(
            "rate_min ({}) must be below rate_max ({})",
            min, max
        )));
    }
    npv::check_rate(min)?;

    let width = (max - min) / (steps - 1) as f64;
    Ok((0..steps)
        .map(|i| if i == steps - 1 { max } else { min + width * i as f64 })
        .collect())
}

impl NpvCurve {
    /// Sample NPV over `[rate_min, rate_max]` and solve for the IRR with
    /// the given settings. A series without an IRR still gets a curve.
    pub fn generate(
        series: &CashFlowSeries,
        rate_min: f64,
        rate_max: f64,
        steps: usize,
        settings: &SolverSettings,
    ) -> IrrResult<Self> {
        let rates = rate_grid(rate_min, rate_max, steps)?;

        let npvs = rates
            .par_iter()
            .map(|&rate| npv::npv(series, rate))
            .collect::<IrrResult<Vec<f64>>>()?;

        let irr = match irr_with(series, settings) {
            Ok(solution) => Some(solution.rate),
            Err(e) => {
                log::debug!("No IRR for curve series: {}", e);
                None
            }
        };

        Ok(Self { rates, npvs, irr })
    }

    /// Curve with the default range (-50% to 50%, 100 points)
    pub fn with_defaults(series: &CashFlowSeries) -> IrrResult<Self> {
        Self::generate(
            series,
            DEFAULT_RATE_MIN,
            DEFAULT_RATE_MAX,
            DEFAULT_STEPS,
            &SolverSettings::default(),
        )
    }

    /// Write `rate,npv` rows
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), csv::Error> {
        let mut out = csv::Writer::from_writer(writer);
        out.write_record(["rate", "npv"])?;
        for (rate, value) in self.rates.iter().zip(&self.npvs) {
            out.write_record([format!("{:.8}", rate), format!("{:.8}", value)])?;
        }
        out.flush()?;
        Ok(())
    }
}

impl CurveComparison {
    pub fn compare(
        primary: &CashFlowSeries,
        other: Option<&CashFlowSeries>,
        rate_min: f64,
        rate_max: f64,
        steps: usize,
        settings: &SolverSettings,
    ) -> IrrResult<Self> {
        Ok(Self {
            primary: NpvCurve::generate(primary, rate_min, rate_max, steps, settings)?,
            compare: other
                .map(|series| NpvCurve::generate(series, rate_min, rate_max, steps, settings))
                .transpose()?,
        })
    }

    /// Write `rate,npv[,npv_compare]` rows
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), csv::Error> {
        let Some(compare) = &self.compare else {
            return self.primary.write_csv(writer);
        };

        let mut out = csv::Writer::from_writer(writer);
        out.write_record(["rate", "npv", "npv_compare"])?;
        for ((rate, a), b) in self.primary.rates.iter().zip(&self.primary.npvs).zip(&compare.npvs) {
            out.write_record([
                format!("{:.8}", rate),
                format!("{:.8}", a),
                format!("{:.8}", b),
            ])?;
        }
        out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn series(flows: &[f64]) -> CashFlowSeries {
        CashFlowSeries::new(flows.to_vec()).unwrap()
    }

    #[test]
    fn test_rate_grid_endpoints() {
        let grid = rate_grid(-0.5, 0.5, 101).unwrap();
        assert_eq!(grid.len(), 101);
        assert_eq!(grid[0], -0.5);
        assert_eq!(grid[100], 0.5);
        assert_relative_eq!(grid[50], 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_rate_grid_rejects_bad_ranges() {
        assert!(matches!(rate_grid(0.5, -0.5, 10), Err(IrrError::InvalidConfig { .. })));
        assert!(matches!(rate_grid(-0.5, 0.5, 1), Err(IrrError::InvalidConfig { .. })));
        assert!(matches!(rate_grid(-1.0, 0.5, 10), Err(IrrError::Domain { .. })));
    }

    #[test]
    fn test_curve_values_and_irr() {
        let s = series(&[-100.0, 110.0]);
        let curve = NpvCurve::with_defaults(&s).unwrap();
        assert_eq!(curve.rates.len(), DEFAULT_STEPS);
        assert_eq!(curve.npvs.len(), DEFAULT_STEPS);
        // NPV falls as the rate rises for a conventional investment
        assert!(curve.npvs.windows(2).all(|w| w[1] <= w[0]));
        assert_relative_eq!(curve.irr.unwrap(), 0.10, epsilon = 1e-6);
    }

    #[test]
    fn test_curve_without_irr() {
        let s = series(&[-1000.0, -500.0, -500.0]);
        let curve = NpvCurve::with_defaults(&s).unwrap();
        assert!(curve.irr.is_none());
        assert!(curve.npvs.iter().all(|v| *v < 0.0));
    }

    #[test]
    fn test_comparison_csv() {
        let a = series(&[-100.0, 110.0]);
        let b = series(&[-100.0, 120.0]);
        let cmp = CurveComparison::compare(&a, Some(&b), 0.0, 0.2, 3, &SolverSettings::default()).unwrap();
        assert_relative_eq!(cmp.compare.as_ref().unwrap().irr.unwrap(), 0.20, epsilon = 1e-6);

        let mut buf = Vec::new();
        cmp.write_csv(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "rate,npv,npv_compare");
        assert_eq!(lines.len(), 4);
        assert!(lines[1].starts_with("0.00000000,10.00000000,20.00000000"));
    }
}
