//! Core value types for the simulation engine.

use std::collections::HashMap;

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SimulationError};

/// Return model used to sample per-step asset returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelType {
    /// Multivariate Gaussian returns. The baseline model.
    Gaussian,
    /// Fat-tailed multivariate Student-t returns.
    StudentT,
    /// Two-state (calm/crisis) Markov regime-switching model.
    RegimeSwitching,
}

impl TryFrom<&str> for ModelType {
    type Error = SimulationError;

    /// Parse a model type from an untyped string, as a caller assembling a
    /// request from a warehouse record or request body would. Unrecognised
    /// values surface as [`SimulationError::UnknownEnum`] at this
    /// factory-dispatch boundary rather than mid-loop.
    fn try_from(value: &str) -> Result<Self> {
        match value {
            "gaussian" => Ok(Self::Gaussian),
            "student_t" => Ok(Self::StudentT),
            "regime_switching" => Ok(Self::RegimeSwitching),
            other => Err(SimulationError::UnknownEnum {
                value: other.to_string(),
            }),
        }
    }
}

/// How the caller derived `mu`. Not consumed by the engine itself; carried
/// through so a request can be round-tripped and audited end to end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MuType {
    /// Expected returns derived from historical sample means.
    Historical,
    /// Expected returns derived from forward-looking estimates.
    Forward,
}

/// Economic stress scenario overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioType {
    /// Persistent low-return regime modelled on Japan's 1990s-2000s
    /// deflationary stagnation.
    JapanLostDecade,
    /// Elevated volatility, reduced real returns, correlation breakdown.
    Stagflation,
}

impl TryFrom<&str> for ScenarioType {
    type Error = SimulationError;

    /// Parse a scenario type from an untyped string. Unrecognised values
    /// surface as [`SimulationError::UnknownEnum`] at this factory-dispatch
    /// boundary, mirroring [`ModelType`]'s conversion.
    fn try_from(value: &str) -> Result<Self> {
        match value {
            "japan_lost_decade" => Ok(Self::JapanLostDecade),
            "stagflation" => Ok(Self::Stagflation),
            other => Err(SimulationError::UnknownEnum {
                value: other.to_string(),
            }),
        }
    }
}

/// How often rebalancing is considered. See [`crate::rebalancer`] for the
/// caveat that this currently only gates on drift, not on cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RebalanceFrequency {
    /// Evaluated every quarter (unused beyond "rebalancing is enabled" —
    /// see [`crate::rebalancer`]).
    Quarterly,
    /// Evaluated every month (unused beyond "rebalancing is enabled" —
    /// see [`crate::rebalancer`]).
    Monthly,
}

/// How `ruin_threshold` should be interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuinThresholdType {
    /// `ruin_threshold` is a fractional loss from the initial value.
    Percentage,
    /// `ruin_threshold` is an absolute floor on portfolio value.
    Absolute,
}

impl std::fmt::Display for RuinThresholdType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Percentage => write!(f, "percentage"),
            Self::Absolute => write!(f, "absolute"),
        }
    }
}

/// Hidden market regime used by the regime-switching model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Regime {
    /// Normal market conditions.
    Calm,
    /// Elevated volatility, reduced returns, correlation contagion.
    Crisis,
}

/// Prepared, validated portfolio parameters.
///
/// Constructed once per simulation request; immutable for the lifetime of
/// the run. The covariance matrix is derived at construction time rather
/// than recomputed on every access.
#[derive(Debug, Clone)]
pub struct SimulationParams {
    tickers: Vec<String>,
    weights: DVector<f64>,
    mu: DVector<f64>,
    volatility: DVector<f64>,
    correlation: DMatrix<f64>,
    covariance: DMatrix<f64>,
    initial_portfolio_value: f64,
}

impl SimulationParams {
    /// Validate and construct simulation parameters.
    ///
    /// Checks: equal vector lengths, weights summing to 1 (tolerance
    /// `1e-6`), strictly positive volatilities, a square correlation matrix
    /// with unit diagonal and symmetric off-diagonal entries in `[-1, 1]`,
    /// and a positive initial portfolio value.
    pub fn new(
        tickers: Vec<String>,
        weights: Vec<f64>,
        mu: Vec<f64>,
        volatility: Vec<f64>,
        correlation_matrix: Vec<Vec<f64>>,
        initial_portfolio_value: f64,
    ) -> Result<Self> {
        let n = tickers.len();
        if weights.len() != n || mu.len() != n || volatility.len() != n {
            return Err(SimulationError::invalid_parameter(format!(
                "tickers/weights/mu/volatility must all have length {n}"
            )));
        }
        if n == 0 {
            return Err(SimulationError::invalid_parameter(
                "portfolio must contain at least one asset",
            ));
        }

        let weight_sum: f64 = weights.iter().sum();
        if (weight_sum - 1.0).abs() > 1e-6 {
            return Err(SimulationError::invalid_parameter(format!(
                "weights must sum to 1.0, got {weight_sum}"
            )));
        }
        if weights.iter().any(|w| *w < 0.0) {
            return Err(SimulationError::invalid_parameter(
                "weights must be nonnegative",
            ));
        }
        if volatility.iter().any(|v| *v <= 0.0) {
            return Err(SimulationError::invalid_parameter(
                "volatility must be strictly positive for every asset",
            ));
        }
        if initial_portfolio_value <= 0.0 {
            return Err(SimulationError::invalid_parameter(
                "initial_portfolio_value must be positive",
            ));
        }

        if correlation_matrix.len() != n || correlation_matrix.iter().any(|row| row.len() != n) {
            return Err(SimulationError::invalid_parameter(format!(
                "correlation_matrix must be {n}x{n}"
            )));
        }
        for i in 0..n {
            if (correlation_matrix[i][i] - 1.0).abs() > 1e-6 {
                return Err(SimulationError::invalid_parameter(
                    "correlation_matrix must have a unit diagonal",
                ));
            }
            for j in 0..n {
                let rho = correlation_matrix[i][j];
                if !(-1.0..=1.0).contains(&rho) {
                    return Err(SimulationError::invalid_parameter(format!(
                        "correlation_matrix[{i}][{j}] = {rho} is outside [-1, 1]"
                    )));
                }
                if (rho - correlation_matrix[j][i]).abs() > 1e-9 {
                    return Err(SimulationError::invalid_parameter(
                        "correlation_matrix must be symmetric",
                    ));
                }
            }
        }

        let weights = DVector::from_vec(weights);
        let mu = DVector::from_vec(mu);
        let volatility = DVector::from_vec(volatility);
        let correlation = DMatrix::from_fn(n, n, |i, j| correlation_matrix[i][j]);
        let vol_diag = DMatrix::from_diagonal(&volatility);
        let covariance = &vol_diag * &correlation * &vol_diag;

        Ok(Self {
            tickers,
            weights,
            mu,
            volatility,
            correlation,
            covariance,
            initial_portfolio_value,
        })
    }

    /// Number of assets in the portfolio.
    pub fn n_assets(&self) -> usize {
        self.tickers.len()
    }

    /// Ordered asset tickers.
    pub fn tickers(&self) -> &[String] {
        &self.tickers
    }

    /// Target allocation weights.
    pub fn weights(&self) -> &DVector<f64> {
        &self.weights
    }

    /// Annualised expected arithmetic returns.
    pub fn mu(&self) -> &DVector<f64> {
        &self.mu
    }

    /// Annualised per-asset volatilities.
    pub fn volatility(&self) -> &DVector<f64> {
        &self.volatility
    }

    /// Asset correlation matrix.
    pub fn correlation(&self) -> &DMatrix<f64> {
        &self.correlation
    }

    /// Annualised covariance matrix, derived from volatility and
    /// correlation at construction time.
    pub fn covariance(&self) -> &DMatrix<f64> {
        &self.covariance
    }

    /// Initial portfolio value.
    pub fn initial_portfolio_value(&self) -> f64 {
        self.initial_portfolio_value
    }

    /// Build a copy of these params with `mu` replaced, as used by scenario
    /// overlays that only adjust expected returns.
    pub(crate) fn with_mu(&self, mu: DVector<f64>) -> Self {
        Self {
            mu,
            ..self.clone()
        }
    }

    /// Build a copy of these params with `volatility` and `correlation`
    /// replaced (and `covariance` recomputed), as used by scenario overlays
    /// and the regime-switching model's crisis adjustments.
    pub(crate) fn with_vol_and_correlation(
        &self,
        volatility: DVector<f64>,
        correlation: DMatrix<f64>,
    ) -> Self {
        let vol_diag = DMatrix::from_diagonal(&volatility);
        let covariance = &vol_diag * &correlation * &vol_diag;
        Self {
            volatility,
            correlation,
            covariance,
            ..self.clone()
        }
    }
}

/// Mutable per-path simulation state.
///
/// Created fresh at the start of each path and discarded once the path
/// completes; only the recorded path vector, terminal value, and max
/// drawdown survive into the aggregated result.
#[derive(Debug, Clone)]
pub struct State {
    /// Current portfolio weights, drifted by asset returns since the last
    /// rebalance.
    pub current_weights: DVector<f64>,
    /// Current portfolio value.
    pub portfolio_value: f64,
    /// Current market regime (only meaningful for the regime-switching
    /// model; otherwise stays `Calm`).
    pub current_regime: Regime,
    /// Number of steps elapsed.
    pub step: u32,
}

impl State {
    /// Build the initial state for a fresh path.
    pub fn initial(params: &SimulationParams) -> Self {
        Self {
            current_weights: params.weights().clone(),
            portfolio_value: params.initial_portfolio_value(),
            current_regime: Regime::Calm,
            step: 0,
        }
    }
}

/// A single simulation request.
#[derive(Debug, Clone)]
pub struct SimulationRequest {
    /// Portfolio parameters.
    pub params: SimulationParams,
    /// Number of discrete steps to simulate.
    pub steps: u32,
    /// Number of independent Monte Carlo paths.
    pub num_paths: u32,
    /// Return model to sample from.
    pub model_type: ModelType,
    /// Optional stress scenario overlay.
    pub scenario: Option<ScenarioType>,
    /// Rebalancing cadence, or `None` to never rebalance.
    pub rebalance_frequency: Option<RebalanceFrequency>,
    /// Drift tolerance before rebalancing triggers.
    pub rebalance_threshold: f64,
    /// Transaction cost in basis points of traded value.
    pub transaction_cost_bps: f64,
    /// Number of representative paths to return.
    pub sample_paths_count: u32,
    /// Optional ruin threshold.
    pub ruin_threshold: Option<f64>,
    /// How to interpret `ruin_threshold`.
    pub ruin_threshold_type: RuinThresholdType,
    /// RNG seed. `None` seeds from OS entropy.
    pub seed: Option<u64>,
}

impl SimulationRequest {
    /// Validate the numeric ranges accepted from the outer surface layer.
    pub fn validate(&self) -> Result<()> {
        if self.steps == 0 {
            return Err(SimulationError::invalid_parameter(
                "steps must be at least 1",
            ));
        }
        if !(100..=10_000).contains(&self.num_paths) {
            return Err(SimulationError::invalid_parameter(
                "num_paths must be between 100 and 10000",
            ));
        }
        if !(1..=50).contains(&self.sample_paths_count) {
            return Err(SimulationError::invalid_parameter(
                "sample_paths_count must be between 1 and 50",
            ));
        }
        if !(0.0..=1.0).contains(&self.rebalance_threshold) {
            return Err(SimulationError::invalid_parameter(
                "rebalance_threshold must be between 0 and 1",
            ));
        }
        if self.transaction_cost_bps < 0.0 {
            return Err(SimulationError::invalid_parameter(
                "transaction_cost_bps must be nonnegative",
            ));
        }
        Ok(())
    }
}

/// Builder-style default configuration, matching the defaults documented in
/// the engine's specification (10bps transaction cost, 5% rebalance
/// threshold, 10 sample paths, percentage-based ruin threshold).
impl SimulationRequest {
    /// Construct a request with the documented defaults for every field
    /// except `params`, `steps`, and `num_paths`.
    pub fn new(params: SimulationParams, steps: u32, num_paths: u32) -> Self {
        Self {
            params,
            steps,
            num_paths,
            model_type: ModelType::Gaussian,
            scenario: None,
            rebalance_frequency: None,
            rebalance_threshold: 0.05,
            transaction_cost_bps: 10.0,
            sample_paths_count: 10,
            ruin_threshold: None,
            ruin_threshold_type: RuinThresholdType::Percentage,
            seed: None,
        }
    }
}

/// A single representative simulation path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SamplePath {
    /// Percentile of terminal value this path represents, in `[1, 99]`.
    pub percentile: u32,
    /// Full sequence of portfolio values, length `steps + 1`.
    pub values: Vec<f64>,
    /// Terminal portfolio value (equal to `values.last()`).
    pub terminal_value: f64,
}

/// Summary risk statistics computed over all simulated paths.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSummary {
    /// Mean terminal portfolio value across all paths.
    pub terminal_wealth_mean: f64,
    /// Median terminal portfolio value.
    pub terminal_wealth_median: f64,
    /// Terminal-value percentiles at keys 5, 25, 75, 95.
    pub terminal_wealth_percentiles: HashMap<u32, f64>,
    /// Mean of per-path maximum drawdown.
    pub max_drawdown_mean: f64,
    /// Max-drawdown percentiles at keys 5, 25, 75, 95.
    pub max_drawdown_percentiles: HashMap<u32, f64>,
    /// Mean of the worst 5% of terminal values.
    pub cvar_95: f64,
    /// Fraction of paths whose terminal value fell below the ruin level.
    pub probability_of_ruin: f64,
    /// Echoed ruin threshold, if one was requested.
    pub ruin_threshold: Option<f64>,
    /// Echoed ruin threshold type, as a string for display/serialization.
    pub ruin_threshold_type: String,
}

/// Complete results from a simulation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationResult {
    /// Summary risk statistics.
    pub metrics: MetricsSummary,
    /// Representative paths at evenly-spaced percentiles.
    pub sample_paths: Vec<SamplePath>,
    /// Full terminal-value vector, one entry per path.
    pub all_terminal_values: Vec<f64>,
}
