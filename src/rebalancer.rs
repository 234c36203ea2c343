//! Drift-threshold rebalancing check and target-weight snap.

use nalgebra::DVector;

/// Checks portfolio drift against a tolerance and computes the turnover of
/// snapping back to target weights.
pub struct Rebalancer {
    threshold: f64,
}

impl Rebalancer {
    /// Build a rebalancer with the given drift tolerance.
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    /// True if any asset's current weight has drifted from its target by
    /// more than `threshold`.
    pub fn needs_rebalance(&self, current_weights: &DVector<f64>, target_weights: &DVector<f64>) -> bool {
        current_weights
            .iter()
            .zip(target_weights.iter())
            .any(|(w, target)| (w - target).abs() > self.threshold)
    }

    /// Snap back to `target_weights`, returning the new weights and the
    /// one-way turnover incurred: `0.5 * sum(|target_i - w_i|)`.
    pub fn rebalance(
        &self,
        current_weights: &DVector<f64>,
        target_weights: &DVector<f64>,
    ) -> (DVector<f64>, f64) {
        let turnover: f64 = target_weights
            .iter()
            .zip(current_weights.iter())
            .map(|(target, w)| (target - w).abs())
            .sum::<f64>()
            * 0.5;
        (target_weights.clone(), turnover)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn does_not_rebalance_within_tolerance() {
        let rebalancer = Rebalancer::new(0.05);
        let current = DVector::from_vec(vec![0.52, 0.48]);
        let target = DVector::from_vec(vec![0.5, 0.5]);
        assert!(!rebalancer.needs_rebalance(&current, &target));
    }

    #[test]
    fn rebalances_past_tolerance() {
        let rebalancer = Rebalancer::new(0.05);
        let current = DVector::from_vec(vec![0.6, 0.4]);
        let target = DVector::from_vec(vec![0.5, 0.5]);
        assert!(rebalancer.needs_rebalance(&current, &target));
    }

    #[test]
    fn turnover_is_one_way() {
        let rebalancer = Rebalancer::new(0.05);
        let current = DVector::from_vec(vec![0.6, 0.4]);
        let target = DVector::from_vec(vec![0.5, 0.5]);
        let (new_weights, turnover) = rebalancer.rebalance(&current, &target);
        assert_eq!(new_weights, target);
        assert_relative_eq!(turnover, 0.1, epsilon = 1e-12);
    }
}
