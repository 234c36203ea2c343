//! The per-path Monte Carlo loop: composes return models, scenario
//! overlays, rebalancing, and transaction costs into full simulated paths.

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::error::Result;
use crate::frictions::TransactionCosts;
use crate::metrics::compute_metrics;
use crate::models::build_model;
use crate::paths::select_representative_paths;
use crate::rebalancer::Rebalancer;
use crate::scenarios::build_scenario;
use crate::types::{SimulationRequest, SimulationResult, State};

/// Owns the time-scaling convention (`steps_per_year`) shared by every
/// return model and runs complete simulation requests.
///
/// `Simulator` itself holds no per-run state: each call to [`Simulator::run`]
/// seeds a fresh RNG from the request and drives `num_paths` independent
/// paths to completion before reducing them to a [`SimulationResult`].
pub struct Simulator {
    steps_per_year: u32,
}

impl Simulator {
    /// Build a simulator with the given number of steps per simulated year
    /// (used to time-scale annualised return-model parameters).
    pub fn new(steps_per_year: u32) -> Self {
        Self { steps_per_year }
    }
}

impl Default for Simulator {
    /// Quarterly stepping, the engine's documented default.
    fn default() -> Self {
        Self::new(4)
    }
}

impl Simulator {
    /// Run a complete simulation request end to end.
    ///
    /// Validates the request, seeds a single RNG stream from
    /// `request.seed` (or OS entropy if absent), then for each of
    /// `num_paths` independent paths: applies the scenario overlay (if
    /// any), samples returns, applies an additive shock (if any), advances
    /// state, and rebalances with transaction costs, in that fixed order.
    /// After all paths complete, reduces the results to summary metrics
    /// and a set of representative sample paths.
    pub fn run(&self, request: &SimulationRequest) -> Result<SimulationResult> {
        request.validate()?;

        let model = build_model(request.model_type, self.steps_per_year)?;
        let scenario = request.scenario.map(build_scenario);
        let rebalancer = Rebalancer::new(request.rebalance_threshold);
        let transaction_costs = TransactionCosts::new(request.transaction_cost_bps);

        let mut rng = match request.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut all_terminal_values = Vec::with_capacity(request.num_paths as usize);
        let mut all_max_drawdowns = Vec::with_capacity(request.num_paths as usize);
        let mut all_paths = Vec::with_capacity(request.num_paths as usize);

        for _ in 0..request.num_paths {
            let mut state = State::initial(&request.params);
            let mut values = Vec::with_capacity(request.steps as usize + 1);
            values.push(state.portfolio_value);
            let mut peak = state.portfolio_value;
            let mut max_drawdown = 0.0f64;

            for t in 0..request.steps {
                let step_params = match &scenario {
                    Some(scenario) => scenario.apply(&request.params, &state, t),
                    None => request.params.clone(),
                };

                let mut returns = model.sample_returns(&state, &step_params, t, &mut rng)?;
                if let Some(scenario) = &scenario {
                    if let Some(shock) = scenario.apply_shock(&state, t) {
                        returns += shock;
                    }
                }

                state = model.update_state(&state, &returns, &mut rng);

                if request.rebalance_frequency.is_some()
                    && rebalancer.needs_rebalance(&state.current_weights, request.params.weights())
                {
                    let (new_weights, turnover) =
                        rebalancer.rebalance(&state.current_weights, request.params.weights());
                    let cost = transaction_costs.calculate_cost(state.portfolio_value, turnover);
                    state.current_weights = new_weights;
                    state.portfolio_value -= cost;
                }

                values.push(state.portfolio_value);
                peak = peak.max(state.portfolio_value);
                if peak > 0.0 {
                    max_drawdown = max_drawdown.max((peak - state.portfolio_value) / peak);
                }
            }

            all_terminal_values.push(state.portfolio_value);
            all_max_drawdowns.push(max_drawdown);
            all_paths.push(values);
        }

        let metrics = compute_metrics(
            &all_terminal_values,
            &all_max_drawdowns,
            request.params.initial_portfolio_value(),
            request.ruin_threshold,
            request.ruin_threshold_type,
        );
        let sample_paths = select_representative_paths(
            &all_terminal_values,
            &all_paths,
            request.sample_paths_count,
        );

        Ok(SimulationResult {
            metrics,
            sample_paths,
            all_terminal_values,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use crate::types::{ModelType, RuinThresholdType, ScenarioType, SimulationParams};

    fn baseline_params() -> SimulationParams {
        SimulationParams::new(
            vec!["SPY".into(), "BND".into(), "GLD".into()],
            vec![0.6, 0.3, 0.1],
            vec![0.10, 0.04, 0.05],
            vec![0.18, 0.05, 0.15],
            vec![
                vec![1.0, 0.2, 0.0],
                vec![0.2, 1.0, 0.1],
                vec![0.0, 0.1, 1.0],
            ],
            100_000.0,
        )
        .unwrap()
    }

    fn baseline_request() -> SimulationRequest {
        let mut request = SimulationRequest::new(baseline_params(), 20, 1000);
        request.seed = Some(42);
        request
    }

    #[test]
    fn baseline_run_produces_finite_values_with_spread() {
        let simulator = Simulator::default();
        let result = simulator.run(&baseline_request()).unwrap();
        assert_eq!(result.all_terminal_values.len(), 1000);
        assert!(result.all_terminal_values.iter().all(|v| v.is_finite()));
        let p5 = result.metrics.terminal_wealth_percentiles[&5];
        let p95 = result.metrics.terminal_wealth_percentiles[&95];
        assert!(p5 < p95);
    }

    #[test]
    fn same_seed_is_deterministic() {
        let simulator = Simulator::default();
        let r1 = simulator.run(&baseline_request()).unwrap();
        let r2 = simulator.run(&baseline_request()).unwrap();
        assert_eq!(r1.all_terminal_values, r2.all_terminal_values);
    }

    #[test]
    fn different_seeds_diverge() {
        let simulator = Simulator::default();
        let mut other = baseline_request();
        other.seed = Some(123);
        let r1 = simulator.run(&baseline_request()).unwrap();
        let r2 = simulator.run(&other).unwrap();
        assert_ne!(r1.all_terminal_values, r2.all_terminal_values);
    }

    #[test]
    fn ruin_probability_matches_threshold_fraction() {
        let simulator = Simulator::default();
        let mut request = baseline_request();
        request.ruin_threshold = Some(0.30);
        request.ruin_threshold_type = RuinThresholdType::Percentage;
        let result = simulator.run(&request).unwrap();
        let expected = result
            .all_terminal_values
            .iter()
            .filter(|v| **v < 70_000.0)
            .count() as f64
            / 1000.0;
        assert_relative_eq!(result.metrics.probability_of_ruin, expected, epsilon = 1e-12);
    }

    #[test]
    fn japan_scenario_lowers_mean_wealth() {
        let simulator = Simulator::default();
        let baseline = simulator.run(&baseline_request()).unwrap();
        let mut japan_request = baseline_request();
        japan_request.scenario = Some(ScenarioType::JapanLostDecade);
        let japan = simulator.run(&japan_request).unwrap();
        assert!(japan.metrics.terminal_wealth_mean < baseline.metrics.terminal_wealth_mean);
    }

    #[test]
    fn stagflation_scenario_increases_dispersion() {
        fn std_dev(values: &[f64]) -> f64 {
            let mean = values.iter().sum::<f64>() / values.len() as f64;
            let variance =
                values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
            variance.sqrt()
        }

        let simulator = Simulator::default();
        let baseline = simulator.run(&baseline_request()).unwrap();
        let mut stagflation_request = baseline_request();
        stagflation_request.scenario = Some(ScenarioType::Stagflation);
        let stagflation = simulator.run(&stagflation_request).unwrap();
        assert!(std_dev(&stagflation.all_terminal_values) > std_dev(&baseline.all_terminal_values));
    }

    #[test]
    fn returns_exact_sample_path_count() {
        let simulator = Simulator::default();
        let mut request = baseline_request();
        request.sample_paths_count = 15;
        let result = simulator.run(&request).unwrap();
        assert_eq!(result.sample_paths.len(), 15);
        for sample in &result.sample_paths {
            assert_eq!(sample.values.len(), 21);
        }
    }

    #[test]
    fn student_t_tail_is_not_much_narrower_than_gaussian() {
        let simulator = Simulator::default();
        let mut t_request = baseline_request();
        t_request.num_paths = 10_000;
        t_request.model_type = ModelType::StudentT;
        let mut gaussian_request = baseline_request();
        gaussian_request.num_paths = 10_000;

        let t_result = simulator.run(&t_request).unwrap();
        let gaussian_result = simulator.run(&gaussian_request).unwrap();

        let range = |values: &[f64]| {
            let max = values.iter().cloned().fold(f64::MIN, f64::max);
            let min = values.iter().cloned().fold(f64::MAX, f64::min);
            max - min
        };

        let t_range = range(&t_result.all_terminal_values);
        let gaussian_range = range(&gaussian_result.all_terminal_values);
        assert!(t_range >= 0.8 * gaussian_range);
    }
}
