//! Return-generating models for the per-path simulation loop.

mod gaussian;
mod regime_switching;
mod student_t;

pub use gaussian::Gaussian;
pub use regime_switching::RegimeSwitching;
pub use student_t::StudentT;

use nalgebra::DVector;
use rand::rngs::StdRng;

use crate::error::{Result, SimulationError};
use crate::types::{ModelType, SimulationParams, State};

/// A per-step return-generating model.
///
/// Implementations sample a per-asset arithmetic return for the current
/// step and then advance the mutable path state given those returns.
/// Returns are already time-scaled to a single step, so portfolio value
/// evolves as `V' = V * (1 + w^T r)`.
pub trait ReturnModel: Send + Sync {
    /// Sample a per-asset return vector for step `t`.
    fn sample_returns(
        &self,
        state: &State,
        params: &SimulationParams,
        t: u32,
        rng: &mut StdRng,
    ) -> Result<DVector<f64>>;

    /// Advance state given the observed returns for this step.
    ///
    /// The default implementation applies the common asset-drift update
    /// described in the engine's specification: new per-asset values drift
    /// by `(1 + r_i)`, new weights renormalise (falling back to the
    /// previous weights if the post-drift sum is non-positive), and
    /// portfolio value evolves by the weighted return. Models with their
    /// own internal state (regime transitions) override this to extend the
    /// update rather than replace it.
    fn update_state(&self, state: &State, returns: &DVector<f64>, rng: &mut StdRng) -> State {
        let _ = rng;
        advance_common(state, returns)
    }
}

/// Shared state-advancement rule used by every model.
pub(crate) fn advance_common(state: &State, returns: &DVector<f64>) -> State {
    let drifted: DVector<f64> = state
        .current_weights
        .iter()
        .zip(returns.iter())
        .map(|(w, r)| w * (1.0 + r))
        .collect::<Vec<_>>()
        .into();
    let total: f64 = drifted.iter().sum();
    let new_weights = if total > 0.0 {
        drifted / total
    } else {
        state.current_weights.clone()
    };

    let portfolio_return: f64 = state
        .current_weights
        .iter()
        .zip(returns.iter())
        .map(|(w, r)| w * r)
        .sum();
    let new_value = state.portfolio_value * (1.0 + portfolio_return);

    State {
        current_weights: new_weights,
        portfolio_value: new_value,
        current_regime: state.current_regime,
        step: state.step + 1,
    }
}

/// Construct a return model from its enum discriminant, with the defaults
/// documented in the engine's specification (Student-t degrees of freedom
/// 5.0; regime-switching transition probabilities and crisis multipliers at
/// their stated defaults).
pub fn build_model(model_type: ModelType, steps_per_year: u32) -> Result<Box<dyn ReturnModel>> {
    match model_type {
        ModelType::Gaussian => Ok(Box::new(Gaussian::new(steps_per_year))),
        ModelType::StudentT => Ok(Box::new(StudentT::new(5.0, steps_per_year)?)),
        ModelType::RegimeSwitching => Ok(Box::new(RegimeSwitching::new(steps_per_year))),
    }
}

/// Compute the Cholesky factor of a covariance matrix, retrying once with
/// `1e-6 * I` jitter if the matrix is not positive definite, per the
/// engine's numerical-stability convention.
pub(crate) fn cholesky_with_jitter(
    cov: &nalgebra::DMatrix<f64>,
) -> Result<nalgebra::DMatrix<f64>> {
    use nalgebra::linalg::Cholesky;

    if let Some(chol) = Cholesky::new(cov.clone()) {
        return Ok(chol.l());
    }

    let n = cov.nrows();
    let jittered = cov + nalgebra::DMatrix::identity(n, n) * 1e-6;
    if let Some(chol) = Cholesky::new(jittered) {
        return Ok(chol.l());
    }

    let eigen = nalgebra::linalg::SymmetricEigen::new(cov.clone());
    let smallest_eigenvalue = eigen
        .eigenvalues
        .iter()
        .cloned()
        .fold(f64::INFINITY, f64::min);
    Err(SimulationError::NumericalFailure {
        smallest_eigenvalue,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use crate::types::Regime;

    #[test]
    fn advance_common_renormalises_weights() {
        let state = State {
            current_weights: DVector::from_vec(vec![0.5, 0.5]),
            portfolio_value: 100.0,
            current_regime: Regime::Calm,
            step: 0,
        };
        let returns = DVector::from_vec(vec![0.1, -0.1]);
        let next = advance_common(&state, &returns);
        let sum: f64 = next.current_weights.iter().sum();
        assert_relative_eq!(sum, 1.0, epsilon = 1e-12);
        assert_eq!(next.step, 1);
    }

    #[test]
    fn advance_common_falls_back_on_total_wipeout() {
        let state = State {
            current_weights: DVector::from_vec(vec![0.5, 0.5]),
            portfolio_value: 100.0,
            current_regime: Regime::Calm,
            step: 0,
        };
        let returns = DVector::from_vec(vec![-1.0, -1.0]);
        let next = advance_common(&state, &returns);
        assert_eq!(next.current_weights, state.current_weights);
    }

    #[test]
    fn cholesky_with_jitter_succeeds_on_spd_matrix() {
        let cov = nalgebra::DMatrix::from_row_slice(2, 2, &[0.04, 0.01, 0.01, 0.09]);
        assert!(cholesky_with_jitter(&cov).is_ok());
    }
}
