use anyhow::Result;
use tracing::info;

use simulation_engine::{ModelType, ScenarioType, Simulator, SimulationParams, SimulationRequest};

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    info!("Starting portfolio simulation engine");

    let params = SimulationParams::new(
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
    )?;

    let mut request = SimulationRequest::new(params, 40, 2000);
    request.model_type = ModelType::RegimeSwitching;
    request.scenario = Some(ScenarioType::Stagflation);
    request.seed = Some(42);

    let simulator = Simulator::default();
    let result = simulator.run(&request)?;

    info!(
        "terminal wealth mean ${:.2}, median ${:.2}",
        result.metrics.terminal_wealth_mean, result.metrics.terminal_wealth_median
    );
    info!(
        "cvar_95 ${:.2}, probability of ruin {:.4}",
        result.metrics.cvar_95, result.metrics.probability_of_ruin
    );
    info!(
        "{} representative paths selected",
        result.sample_paths.len()
    );

    Ok(())
}
