//! Fat-tailed multivariate Student-t return model.

use nalgebra::DVector;
use rand::rngs::StdRng;
use rand_distr::{ChiSquared, Distribution, StandardNormal};

use super::{cholesky_with_jitter, ReturnModel};
use crate::error::{Result, SimulationError};
use crate::types::{SimulationParams, State};

/// Samples per-step returns from a multivariate Student-t distribution
/// using the representation `r = mu + L*z*sqrt(df/chi2)*sqrt((df-2)/df)`,
/// where `z ~ N(0, I)` and `chi2 ~ chi-squared(df)`. The final factor
/// rescales so the sample covariance matches `step_cov` despite the
/// t-distribution's variance inflation.
pub struct StudentT {
    degrees_of_freedom: f64,
    steps_per_year: u32,
}

impl StudentT {
    /// Create a Student-t model. `degrees_of_freedom` must exceed 2 for
    /// the distribution to have finite variance.
    pub fn new(degrees_of_freedom: f64, steps_per_year: u32) -> Result<Self> {
        if degrees_of_freedom <= 2.0 {
            return Err(SimulationError::invalid_parameter(
                "degrees_of_freedom must be > 2 for finite variance",
            ));
        }
        Ok(Self {
            degrees_of_freedom,
            steps_per_year,
        })
    }
}

impl ReturnModel for StudentT {
    fn sample_returns(
        &self,
        _state: &State,
        params: &SimulationParams,
        _t: u32,
        rng: &mut StdRng,
    ) -> Result<DVector<f64>> {
        let s = self.steps_per_year as f64;
        let step_mu = params.mu() / s;
        let step_cov = params.covariance() / s;

        let l = cholesky_with_jitter(&step_cov)?;
        let n = params.n_assets();
        let z = DVector::from_fn(n, |_, _| StandardNormal.sample(rng));

        let chi2 = ChiSquared::new(self.degrees_of_freedom)
            .expect("degrees_of_freedom already validated at construction")
            .sample(rng);
        let scale = (self.degrees_of_freedom / chi2).sqrt();
        let variance_adjustment = ((self.degrees_of_freedom - 2.0) / self.degrees_of_freedom).sqrt();

        Ok(step_mu + (l * z) * (scale * variance_adjustment))
    }
}
