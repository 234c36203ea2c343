//! Persistent low-return overlay modelled on Japan's 1990s-2000s
//! deflationary stagnation.

use nalgebra::DVector;

use super::Scenario;
use crate::types::{SimulationParams, State};

/// Cuts positive expected returns sharply and trims negative ones, with a
/// floor so drift never implies a certain total wipeout. Volatility and
/// correlation are left unchanged; the scenario is gradual by design and
/// never shocks.
pub struct JapanLostDecade {
    mu_reduction: f64,
    equity_penalty: f64,
    mu_floor: f64,
}

impl JapanLostDecade {
    /// Build the scenario with its documented defaults: `mu_reduction`
    /// 0.2, `equity_penalty` 0.3, floor -0.10.
    pub fn new() -> Self {
        Self {
            mu_reduction: 0.2,
            equity_penalty: 0.3,
            mu_floor: -0.10,
        }
    }
}

impl Default for JapanLostDecade {
    fn default() -> Self {
        Self::new()
    }
}

impl Scenario for JapanLostDecade {
    fn apply(&self, params: &SimulationParams, _state: &State, _t: u32) -> SimulationParams {
        let adjusted = DVector::from_fn(params.n_assets(), |i, _| {
            let base = params.mu()[i];
            let scaled = if base > 0.0 {
                base * (self.mu_reduction - self.equity_penalty)
            } else {
                base * self.mu_reduction
            };
            scaled.max(self.mu_floor)
        });
        params.with_mu(adjusted)
    }
}
