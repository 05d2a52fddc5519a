//! Text parsing for cash-flow lists and rates given on the command line

use crate::error::LoadError;

/// Parse a list of cash flows.
///
/// Accepts a JSON-style list (`[-1000, 300, 700]`), comma-separated values
/// (`-1000,300,700`) or whitespace-separated values (`-1000 300 700`).
pub fn parse_cash_flows(input: &str) -> Result<Vec<f64>, LoadError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(LoadError::Format("cash flows must not be empty".to_string()));
    }

    if trimmed.starts_with('[') {
        return serde_json::from_str::<Vec<f64>>(trimmed).map_err(|e| {
            LoadError::Format(format!(
                "cash flows must be a list of numbers, e.g. [-100, 50, 60] ({})",
                e
            ))
        });
    }

    trimmed
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|token| !token.is_empty())
        .map(|token| {
            token
                .parse::<f64>()
                .map_err(|_| LoadError::Format(format!("'{}' is not a number", token)))
        })
        .collect()
}

/// Parse a rate given as a fraction or a percentage.
///
/// `"15%"` and `"15"` both mean 0.15; a bare number above 1 is read as a
/// percentage, anything else as a fraction (`"0.15"`, `"-0.2"`).
pub fn parse_rate(input: &str) -> Result<f64, LoadError> {
    let trimmed = input.trim();
    let invalid = || {
        LoadError::Format(format!(
            "rate should be a percentage or fraction, e.g. 15% or 0.15 (got '{}')",
            trimmed
        ))
    };

    let (number, percent) = match trimmed.strip_suffix('%') {
        Some(pct) => (pct.trim(), true),
        None => (trimmed, false),
    };

    let value: f64 = number.parse().map_err(|_| invalid())?;
    if !value.is_finite() {
        return Err(invalid());
    }
    Ok(if percent || value > 1.0 { value / 100.0 } else { value })
}
