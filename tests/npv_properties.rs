//! Property tests for the NPV evaluator

use npv_irr::valuation::{npv, npv_and_derivative, npv_derivative, scaled_npv};
use npv_irr::IrrError;
use proptest::prelude::*;

fn flows_with_nonnegative_tail() -> impl Strategy<Value = Vec<f64>> {
    (-1e6..1e6f64, prop::collection::vec(0.0..1e5f64, 1..30)).prop_map(|(first, tail)| {
        let mut flows = vec![first];
        flows.extend(tail);
        flows
    })
}

fn any_flows() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(-1e5..1e5f64, 2..30)
}

/// Long series with a share of exact zeros, the shape that used to give
/// `0/0` and `inf - inf` once the discount factors underflow
fn long_flows() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(prop_oneof![Just(0.0), -1e5..1e5f64], 2..400)
}

proptest! {
    /// Non-negative flows after t=0 make NPV non-increasing in the rate
    #[test]
    fn prop_npv_non_increasing(
        flows in flows_with_nonnegative_tail(),
        r1 in -0.9..5.0f64,
        r2 in -0.9..5.0f64,
    ) {
        let (lo, hi) = if r1 <= r2 { (r1, r2) } else { (r2, r1) };
        prop_assert!(npv(&flows, lo).unwrap() >= npv(&flows, hi).unwrap());
        prop_assert!(npv_derivative(&flows, lo).unwrap() <= 0.0);
    }

    /// Same inputs, same bits
    #[test]
    fn prop_npv_deterministic(flows in any_flows(), rate in -0.99..10.0f64) {
        let a = npv(&flows, rate).unwrap();
        let b = npv(&flows, rate).unwrap();
        prop_assert_eq!(a.to_bits(), b.to_bits());
    }

    /// Small rate changes give small NPV changes
    #[test]
    fn prop_npv_continuous(flows in any_flows(), rate in -0.5..2.0f64) {
        let h = 1e-9;
        let here = npv(&flows, rate).unwrap();
        let near = npv(&flows, rate + h).unwrap();

        // bound the change by the absolute-value series, so cancellation
        // between terms cannot hide rounding error
        let magnitudes: Vec<f64> = flows.iter().map(|cf| cf.abs()).collect();
        let (scale, scale_slope) = npv_and_derivative(&magnitudes, rate).unwrap();
        let bound = scale_slope.abs() * h * 2.0 + 1e-12 * scale;
        prop_assert!((near - here).abs() <= bound);
    }

    /// Every rate at or below -1 is rejected
    #[test]
    fn prop_domain_rejected(flows in any_flows(), rate in -100.0..=-1.0f64) {
        prop_assert_eq!(npv(&flows, rate), Err(IrrError::Domain { rate }));
        prop_assert!(npv_derivative(&flows, rate).is_err());
    }

    /// A valid rate gives a finite value or an error, never NaN or inf
    #[test]
    fn prop_npv_finite_or_error(flows in long_flows(), rate in -0.99999..10.0f64) {
        match npv(&flows, rate) {
            Ok(value) => prop_assert!(value.is_finite()),
            Err(e) => prop_assert_eq!(e, IrrError::Overflow { rate }),
        }
        if let Ok(slope) = npv_derivative(&flows, rate) {
            prop_assert!(slope.is_finite());
        }
        if let Ok((value, slope)) = npv_and_derivative(&flows, rate) {
            prop_assert!(value.is_finite() && slope.is_finite());
        }
    }

    /// The scaled form is always finite and agrees in sign with NPV
    #[test]
    fn prop_scaled_npv_sign(flows in long_flows(), rate in -0.99999..10.0f64) {
        let scaled = scaled_npv(&flows, rate).unwrap();
        prop_assert!(scaled.is_finite());

        // only compare where rounding cannot flip the sign: both values
        // well clear of the same sums taken over |cf|
        let magnitudes: Vec<f64> = flows.iter().map(|cf| cf.abs()).collect();
        let scaled_scale = scaled_npv(&magnitudes, rate).unwrap();
        if let (Ok(value), Ok(scale)) = (npv(&flows, rate), npv(&magnitudes, rate)) {
            let clear = value.abs() > 1e-9 * scale && scaled.abs() > 1e-9 * scaled_scale;
            if clear && scaled_scale > 1e-250 {
                prop_assert_eq!(value > 0.0, scaled > 0.0);
            }
        }
    }
}
