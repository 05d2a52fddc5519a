//! Net present value and its rate derivative

use crate::error::{IrrError, IrrResult};

/// Reject rates at or below -1 (and NaN), where `1 + rate` is not a valid
/// discount base
#[inline]
pub fn check_rate(rate: f64) -> IrrResult<()> {
    // written so that NaN fails too
    if !(rate > -1.0) {
        return Err(IrrError::Domain { rate });
    }
    Ok(())
}

/// Net present value of `cashflows` at a per-period `rate`.
///
/// `cashflows[0]` is undiscounted; `cashflows[t]` is divided by `(1 + rate)^t`.
///
/// # Example
/// ```
/// use npv_irr::npv;
///
/// let value = npv(&[-1000.0, 400.0, 500.0, 600.0], 0.10).unwrap();
/// assert!((value - 227.65).abs() < 0.01);
/// ```
pub fn npv(cashflows: &[f64], rate: f64) -> IrrResult<f64> {
    check_rate(rate)?;

    let base = 1.0 + rate;
    let value: f64 = cashflows
        .iter()
        .enumerate()
        .filter(|(_, cf)| **cf != 0.0)
        .map(|(t, &cf)| cf / base.powi(t as i32))
        .sum();
    finite(value, rate)
}

/// A finite value with the same sign as `npv(cashflows, rate)`.
///
/// Below 0% this is NPV multiplied by `(1 + rate)^n` (n the last period),
/// evaluated in Horner form as `sum cf[t] * (1 + rate)^(n - t)`. Its terms
/// shrink with distance from the last period, so it stays finite next to
/// -100% where NPV of a long series overflows. From 0% up NPV is already
/// bounded by the undiscounted magnitudes and is returned unchanged.
pub fn scaled_npv(cashflows: &[f64], rate: f64) -> IrrResult<f64> {
    check_rate(rate)?;

    if rate >= 0.0 {
        return npv(cashflows, rate);
    }
    let base = 1.0 + rate;
    let value = cashflows.iter().fold(0.0, |acc, &cf| acc * base + cf);
    finite(value, rate)
}

fn finite(value: f64, rate: f64) -> IrrResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(IrrError::Overflow { rate })
    }
}

/// d(NPV)/d(rate) = sum over t >= 1 of `-t * cf / (1 + rate)^(t + 1)`
pub fn npv_derivative(cashflows: &[f64], rate: f64) -> IrrResult<f64> {
    check_rate(rate)?;

    let base = 1.0 + rate;
    let slope: f64 = cashflows
        .iter()
        .enumerate()
        .skip(1)
        .filter(|(_, cf)| **cf != 0.0)
        .map(|(t, &cf)| -(t as f64) * cf / base.powi(t as i32 + 1))
        .sum();
    finite(slope, rate)
}

/// NPV and its derivative in a single pass over the cash flows
pub fn npv_and_derivative(cashflows: &[f64], rate: f64) -> IrrResult<(f64, f64)> {
    check_rate(rate)?;

    let base = 1.0 + rate;
    let mut value = 0.0;
    let mut slope = 0.0;

    for (t, &cf) in cashflows.iter().enumerate().filter(|(_, cf)| **cf != 0.0) {
        let discount = base.powi(t as i32);
        value += cf / discount;
        if t > 0 {
            slope -= (t as f64) * cf / (discount * base);
        }
    }

    Ok((finite(value, rate)?, finite(slope, rate)?))
}

/// NPV where the outlay is given separately as a positive amount and
/// `flows[k]` is received at the end of period `k + 1`
pub fn npv_with_initial_investment(initial_investment: f64, flows: &[f64], rate: f64) -> IrrResult<f64> {
    check_rate(rate)?;

    let base = 1.0 + rate;
    let discounted: f64 = flows
        .iter()
        .enumerate()
        .filter(|(_, cf)| **cf != 0.0)
        .map(|(k, &cf)| cf / base.powi(k as i32 + 1))
        .sum();

    finite(discounted - initial_investment, rate)
}
