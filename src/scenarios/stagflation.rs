//! Elevated-volatility, correlation-breakdown overlay modelled on 1970s
//! stagflation.

use nalgebra::DMatrix;

use super::Scenario;
use crate::types::{SimulationParams, State};

/// Reduces expected returns, inflates volatility, and pushes correlations
/// up to simulate diversification breaking down under stagflation. No
/// shocks.
pub struct Stagflation {
    mu_reduction_factor: f64,
    volatility_multiplier: f64,
    correlation_increase: f64,
    correlation_cap: f64,
}

impl Stagflation {
    /// Build the scenario with its documented defaults: `mu_reduction_factor`
    /// 0.5, `volatility_multiplier` 1.5, `correlation_increase` 0.2, capped
    /// at 0.95.
    pub fn new() -> Self {
        Self {
            mu_reduction_factor: 0.5,
            volatility_multiplier: 1.5,
            correlation_increase: 0.2,
            correlation_cap: 0.95,
        }
    }
}

impl Default for Stagflation {
    fn default() -> Self {
        Self::new()
    }
}

impl Scenario for Stagflation {
    fn apply(&self, params: &SimulationParams, _state: &State, _t: u32) -> SimulationParams {
        let mu = params.mu() * self.mu_reduction_factor;
        let volatility = params.volatility() * self.volatility_multiplier;
        let n = params.n_assets();
        let correlation = DMatrix::from_fn(n, n, |i, j| {
            if i == j {
                params.correlation()[(i, j)]
            } else {
                (params.correlation()[(i, j)] + self.correlation_increase).min(self.correlation_cap)
            }
        });
        params.with_mu(mu).with_vol_and_correlation(volatility, correlation)
    }
}
