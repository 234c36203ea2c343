//! Selection of representative simulated paths at evenly-spaced
//! percentiles of terminal value.

use crate::types::SamplePath;

/// Select `k` representative paths from `terminal_values`/`paths`
/// (parallel arrays, one entry per simulated path).
///
/// Target percentiles are `floor(100/k * (i + 0.5))` clamped to 99, for
/// `i = 0..k`. For each target percentile `p`, the path whose rank among
/// paths sorted by terminal value is `floor((p/100) * (num_paths - 1))` is
/// selected — always a real simulated path, never a synthetic quantile.
/// Returns `num_paths` selections if `k > num_paths`, and none if `k == 0`.
pub fn select_representative_paths(
    terminal_values: &[f64],
    paths: &[Vec<f64>],
    k: u32,
) -> Vec<SamplePath> {
    let num_paths = terminal_values.len();
    if k == 0 || num_paths == 0 {
        return Vec::new();
    }

    let mut order: Vec<usize> = (0..num_paths).collect();
    order.sort_by(|&a, &b| terminal_values[a].partial_cmp(&terminal_values[b]).unwrap());

    let k = k.min(num_paths as u32);
    (0..k)
        .map(|i| {
            let percentile = (((100.0 / k as f64) * (i as f64 + 0.5)).floor() as u32).min(99);
            let rank = ((percentile as f64 / 100.0) * (num_paths - 1) as f64).floor() as usize;
            let path_index = order[rank];
            SamplePath {
                percentile,
                values: paths[path_index].clone(),
                terminal_value: terminal_values[path_index],
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selects_none_when_k_is_zero() {
        let values = vec![1.0, 2.0, 3.0];
        let paths = vec![vec![1.0], vec![2.0], vec![3.0]];
        assert!(select_representative_paths(&values, &paths, 0).is_empty());
    }

    #[test]
    fn selects_evenly_spaced_percentiles() {
        let values: Vec<f64> = (0..10).map(|i| i as f64).collect();
        let paths: Vec<Vec<f64>> = values.iter().map(|v| vec![*v]).collect();
        let selected = select_representative_paths(&values, &paths, 5);
        assert_eq!(selected.len(), 5);
        // Percentiles should be increasing and each path real (terminal
        // value equal to one of the inputs).
        let mut prev = -1i64;
        for sample in &selected {
            assert!(sample.percentile as i64 > prev);
            prev = sample.percentile as i64;
            assert!(values.contains(&sample.terminal_value));
        }
    }

    #[test]
    fn clamps_k_to_num_paths() {
        let values = vec![1.0, 2.0, 3.0];
        let paths = vec![vec![1.0], vec![2.0], vec![3.0]];
        let selected = select_representative_paths(&values, &paths, 50);
        assert_eq!(selected.len(), 3);
    }

    #[test]
    fn includes_tails_without_duplicating_extremes() {
        let values: Vec<f64> = (0..1000).map(|i| i as f64).collect();
        let paths: Vec<Vec<f64>> = values.iter().map(|v| vec![*v]).collect();
        let selected = select_representative_paths(&values, &paths, 15);
        assert_eq!(selected.len(), 15);
        assert!(selected[0].terminal_value < selected[14].terminal_value);
    }
}
