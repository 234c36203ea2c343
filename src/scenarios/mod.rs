//! Stress scenario overlays applied to portfolio parameters before sampling.

mod japan_lost_decade;
mod stagflation;

pub use japan_lost_decade::JapanLostDecade;
pub use stagflation::Stagflation;

use nalgebra::DVector;

use crate::types::{ScenarioType, SimulationParams, State};

/// A stress scenario: a per-step parameter overlay plus an optional
/// one-time additive return shock.
///
/// Both methods are pure and stateless — a scenario never mutates itself
/// or the state it is given, only returns a transformed view of the
/// parameters the model is about to sample from.
pub trait Scenario: Send + Sync {
    /// Return a (possibly modified) copy of `params` for this step. Called
    /// before the return model samples.
    fn apply(&self, params: &SimulationParams, state: &State, t: u32) -> SimulationParams;

    /// An optional additive one-time return shock for this step, added to
    /// the model's sampled return before the state advances. The default
    /// implementation never shocks.
    fn apply_shock(&self, state: &State, t: u32) -> Option<DVector<f64>> {
        let _ = (state, t);
        None
    }
}

/// Construct a scenario overlay from its enum discriminant.
pub fn build_scenario(scenario_type: ScenarioType) -> Box<dyn Scenario> {
    match scenario_type {
        ScenarioType::JapanLostDecade => Box::new(JapanLostDecade::new()),
        ScenarioType::Stagflation => Box::new(Stagflation::new()),
    }
}
