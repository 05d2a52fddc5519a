//! Option payoff at expiry, net of premium

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OptionType {
    Call,
    Put,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Position {
    Long,
    Short,
}

/// Classification of a net payoff
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Profit,
    Loss,
    BreakEven,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Profit => write!(f, "Profit"),
            Outcome::Loss => write!(f, "Loss"),
            Outcome::BreakEven => write!(f, "Break-even"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Payoff {
    pub amount: f64,
    pub outcome: Outcome,
}

/// Long call: max(0, S - K) - premium
pub fn net_call_payoff(strike: f64, price_at_expiry: f64, premium: f64) -> f64 {
    (price_at_expiry - strike).max(0.0) - premium
}

/// Long put: max(0, K - S) - premium
pub fn net_put_payoff(strike: f64, price_at_expiry: f64, premium: f64) -> f64 {
    (strike - price_at_expiry).max(0.0) - premium
}

/// Net payoff for either side of a call or put. The short side is the
/// mirror image of the long side (premium received instead of paid).
pub fn compute_payoff(
    option_type: OptionType,
    position: Position,
    strike: f64,
    price_at_expiry: f64,
    premium: f64,
) -> Payoff {
    let long = match option_type {
        OptionType::Call => net_call_payoff(strike, price_at_expiry, premium),
        OptionType::Put => net_put_payoff(strike, price_at_expiry, premium),
    };
    let amount = match position {
        Position::Long => long,
        Position::Short => -long,
    };

    let outcome = if amount > 0.0 {
        Outcome::Profit
    } else if amount < 0.0 {
        Outcome::Loss
    } else {
        Outcome::BreakEven
    };

    Payoff { amount, outcome }
}

/// Payoffs over a range of expiry prices (the data behind a payoff diagram)
pub fn payoff_curve(
    option_type: OptionType,
    position: Position,
    strike: f64,
    prices: &[f64],
    premium: f64,
) -> Vec<f64> {
    prices
        .iter()
        .map(|&price| compute_payoff(option_type, position, strike, price, premium).amount)
        .collect()
}
