//! Reduction of per-path terminal values and drawdowns to summary statistics.

use std::collections::HashMap;

use crate::types::{MetricsSummary, RuinThresholdType};

const PERCENTILE_KEYS: [u32; 4] = [5, 25, 75, 95];

/// Linear-interpolation percentile over a sample that is already sorted
/// ascending. `p` is in `[0, 100]`.
fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.len() == 1 {
        return sorted[0];
    }
    let rank = (p / 100.0) * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    if lower == upper {
        sorted[lower]
    } else {
        let frac = rank - lower as f64;
        sorted[lower] + (sorted[upper] - sorted[lower]) * frac
    }
}

fn percentile_map(sorted: &[f64]) -> HashMap<u32, f64> {
    PERCENTILE_KEYS
        .iter()
        .map(|&key| (key, percentile(sorted, key as f64)))
        .collect()
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn median(sorted: &[f64]) -> f64 {
    percentile(sorted, 50.0)
}

/// Mean of the smallest `max(1, floor(0.05 * num_paths))` terminal values.
fn cvar_95(sorted_terminal_values: &[f64]) -> f64 {
    let tail_size = ((sorted_terminal_values.len() as f64 * 0.05).floor() as usize).max(1);
    mean(&sorted_terminal_values[..tail_size])
}

fn ruin_level(
    initial_value: f64,
    ruin_threshold: f64,
    ruin_threshold_type: RuinThresholdType,
) -> f64 {
    match ruin_threshold_type {
        RuinThresholdType::Percentage => initial_value * (1.0 - ruin_threshold),
        RuinThresholdType::Absolute => ruin_threshold,
    }
}

fn probability_of_ruin(
    terminal_values: &[f64],
    initial_value: f64,
    ruin_threshold: Option<f64>,
    ruin_threshold_type: RuinThresholdType,
) -> f64 {
    let Some(threshold) = ruin_threshold else {
        return 0.0;
    };
    let level = ruin_level(initial_value, threshold, ruin_threshold_type);
    let ruined = terminal_values.iter().filter(|v| **v < level).count();
    ruined as f64 / terminal_values.len() as f64
}

/// Reduce raw per-path terminal values and max drawdowns to a
/// [`MetricsSummary`]. `terminal_values` and `max_drawdowns` must have the
/// same, nonzero length — one entry per simulated path.
pub fn compute_metrics(
    terminal_values: &[f64],
    max_drawdowns: &[f64],
    initial_value: f64,
    ruin_threshold: Option<f64>,
    ruin_threshold_type: RuinThresholdType,
) -> MetricsSummary {
    let mut sorted_terminal = terminal_values.to_vec();
    sorted_terminal.sort_by(|a, b| a.partial_cmp(b).unwrap());
    let mut sorted_drawdowns = max_drawdowns.to_vec();
    sorted_drawdowns.sort_by(|a, b| a.partial_cmp(b).unwrap());

    MetricsSummary {
        terminal_wealth_mean: mean(terminal_values),
        terminal_wealth_median: median(&sorted_terminal),
        terminal_wealth_percentiles: percentile_map(&sorted_terminal),
        max_drawdown_mean: mean(max_drawdowns),
        max_drawdown_percentiles: percentile_map(&sorted_drawdowns),
        cvar_95: cvar_95(&sorted_terminal),
        probability_of_ruin: probability_of_ruin(
            terminal_values,
            initial_value,
            ruin_threshold,
            ruin_threshold_type,
        ),
        ruin_threshold,
        ruin_threshold_type: ruin_threshold_type.to_string(),
    }
}
