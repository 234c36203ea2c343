//! Monte Carlo portfolio stress-testing simulation engine.
//!
//! Given a prepared, validated portfolio (tickers, weights, expected
//! returns, volatilities, correlation matrix, initial value) and a horizon
//! in discrete steps, [`Simulator::run`] projects the distribution of
//! future portfolio wealth under a configurable return model, an optional
//! economic stress scenario, and a drift-threshold rebalancing policy, and
//! reduces the result to summary risk statistics and a handful of
//! representative value paths.
//!
//! The engine performs no I/O and holds no state across calls: it consumes
//! a [`SimulationRequest`] and returns a pure [`SimulationResult`].

pub mod error;
pub mod frictions;
pub mod metrics;
pub mod models;
pub mod paths;
pub mod rebalancer;
pub mod scenarios;
pub mod simulator;
pub mod types;

pub use error::{Result, SimulationError};
pub use simulator::Simulator;
pub use types::{
    MetricsSummary, ModelType, MuType, Regime, RebalanceFrequency, RuinThresholdType, SamplePath,
    ScenarioType, SimulationParams, SimulationRequest, SimulationResult, State,
};
