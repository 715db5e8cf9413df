use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::birl::{
    error::BirlError,
    params::{TransitionWeights, canonical_template},
};

/// Lower clamp for the transition temperature.
pub const BETA_MIN: f64 = -200.0;
/// Upper clamp for the transition temperature.
pub const BETA_MAX: f64 = 200.0;
pub const BETA_PRIOR_MEAN: f64 = 100.0;
pub const BETA_PRIOR_STD: f64 = 1.0;
/// Diagonal entry of the covariance around each canonical weight template.
pub const TPWEIGHT_PRIOR_VARIANCE: f64 = 0.05;

/// Family of the prior placed on reward weights.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriorKind {
    #[default]
    Uniform,
    Gaussian,
    Laplace,
}

/// Log-density of the reward prior.
///
/// Only the uniform prior over `[-r_max, r_max]^d_states` is supported; the value is constant
/// inside the support.
pub fn reward_log_prior(prior: PriorKind, d_states: usize, r_max: f64) -> Result<f64, BirlError> {
    match prior {
        PriorKind::Uniform => Ok(-(d_states as f64) * (2.0 * r_max).ln()),
        PriorKind::Gaussian | PriorKind::Laplace => Err(BirlError::UnsupportedPrior { prior }),
    }
}

/// Sum over directions of the diagonal-Gaussian log-density around the canonical templates.
pub fn tpweights_log_prior(weights: &TransitionWeights) -> f64 {
    weights
        .iter()
        .map(|(direction, entry)| {
            let mean = canonical_template(direction);
            let k = entry.len() as f64;
            let squared_distance: f64 = entry
                .iter()
                .zip(mean.iter())
                .map(|(x, mu)| (x - mu) * (x - mu))
                .sum();
            -0.5 * k * (2.0 * PI * TPWEIGHT_PRIOR_VARIANCE).ln()
                - squared_distance / (2.0 * TPWEIGHT_PRIOR_VARIANCE)
        })
        .sum()
}

/// Log-density of `N(BETA_PRIOR_MEAN, BETA_PRIOR_STD^2)` at `beta`.
pub fn beta_log_prior(beta: f64) -> f64 {
    let z = (beta - BETA_PRIOR_MEAN) / BETA_PRIOR_STD;
    -0.5 * z * z - BETA_PRIOR_STD.ln() - 0.5 * (2.0 * PI).ln()
}
