//! Solver settings shared by the library entry points and the binaries
//!
//! Settings can come from defaults, from environment variables, or be
//! overridden field by field by command-line flags:
//!   IRR_TOLERANCE, IRR_MAX_ITER, IRR_LOW, IRR_HIGH, IRR_INITIAL_RATE

use crate::irr::{
    Bisection, NewtonRaphson, NewtonWithFallback, DEFAULT_HIGH, DEFAULT_INITIAL_RATE, DEFAULT_LOW,
    DEFAULT_MAX_ITERATIONS, DEFAULT_TOLERANCE,
};
use serde::{Deserialize, Serialize};
use std::env;

/// Tolerance, iteration cap and starting points for the IRR solvers
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverSettings {
    pub tolerance: f64,
    pub max_iterations: u32,
    /// Bisection interval
    pub low: f64,
    pub high: f64,
    /// Newton-Raphson starting guess
    pub initial_rate: f64,
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            low: DEFAULT_LOW,
            high: DEFAULT_HIGH,
            initial_rate: DEFAULT_INITIAL_RATE,
        }
    }
}

impl SolverSettings {
    /// Read settings from the environment; missing or unparsable values
    /// keep their defaults
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with a custom variable source
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let read = |key: &str, default: f64| -> f64 {
            lookup(key).and_then(|s| s.trim().parse().ok()).unwrap_or(default)
        };

        Self {
            tolerance: read("IRR_TOLERANCE", defaults.tolerance),
            max_iterations: lookup("IRR_MAX_ITER")
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(defaults.max_iterations),
            low: read("IRR_LOW", defaults.low),
            high: read("IRR_HIGH", defaults.high),
            initial_rate: read("IRR_INITIAL_RATE", defaults.initial_rate),
        }
    }

    pub fn bisection(&self) -> Bisection {
        Bisection {
            low: self.low,
            high: self.high,
            tolerance: self.tolerance,
            max_iterations: self.max_iterations,
        }
    }

    pub fn newton(&self) -> NewtonRaphson {
        NewtonRaphson {
            initial_rate: self.initial_rate,
            tolerance: self.tolerance,
            max_iterations: self.max_iterations,
        }
    }

    pub fn fallback(&self) -> NewtonWithFallback {
        NewtonWithFallback {
            newton: self.newton(),
            bisection: self.bisection(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_lookup_overrides_and_falls_back() {
        let vars: HashMap<&str, &str> = [
            ("IRR_TOLERANCE", "1e-9"),
            ("IRR_MAX_ITER", "50"),
            ("IRR_HIGH", "not-a-number"),
        ]
        .into_iter()
        .collect();

        let settings = SolverSettings::from_lookup(|key| vars.get(key).map(|v| v.to_string()));
        assert_eq!(settings.tolerance, 1e-9);
        assert_eq!(settings.max_iterations, 50);
        assert_eq!(settings.high, DEFAULT_HIGH);
        assert_eq!(settings.low, DEFAULT_LOW);
        assert_eq!(settings.initial_rate, DEFAULT_INITIAL_RATE);
    }

    #[test]
    fn test_solvers_share_settings() {
        let settings = SolverSettings {
            tolerance: 1e-8,
            max_iterations: 200,
            ..SolverSettings::default()
        };
        assert_eq!(settings.bisection().tolerance, 1e-8);
        assert_eq!(settings.newton().max_iterations, 200);
        assert_eq!(settings.fallback().bisection.low, DEFAULT_LOW);
    }

    #[test]
    fn test_partial_json() {
        let settings: SolverSettings = serde_json::from_str(r#"{"initial_rate": 0.25}"#).unwrap();
        assert_eq!(settings.initial_rate, 0.25);
        assert_eq!(settings.max_iterations, DEFAULT_MAX_ITERATIONS);
    }
}
