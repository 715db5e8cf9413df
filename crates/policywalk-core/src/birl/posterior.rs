use crate::birl::{
    config::BirlConfig,
    demos::DemonstrationSet,
    error::BirlError,
    ids::StateAction,
    mdp::BirlMdp,
    params::Sample,
    prior::{PriorKind, beta_log_prior, reward_log_prior, tpweights_log_prior},
};

/// Transition probabilities below this are floored before taking the log.
pub const TRANSITION_PROB_FLOOR: f64 = 1e-16;

/// Numerically stable `ln(sum(exp(values)))`.
pub fn log_sum_exp(values: &[f64]) -> f64 {
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if !max.is_finite() {
        return max;
    }
    max + values.iter().map(|v| (v - max).exp()).sum::<f64>().ln()
}

/// `min(1, exp(delta))`, with NaN deltas mapped to zero.
pub fn acceptance_probability(delta: f64) -> f64 {
    if delta.is_nan() {
        return 0.0;
    }
    delta.exp().clamp(0.0, 1.0)
}

/// Hyperparameters of the unnormalised log-posterior.
#[derive(Debug, Clone, Copy)]
pub struct PosteriorModel {
    /// Boltzmann rationality applied to Q-values in the demonstration likelihood.
    pub rationality: f64,
    pub prior: PriorKind,
    pub d_states: usize,
    pub r_max: f64,
}

impl PosteriorModel {
    pub fn from_config(config: &BirlConfig) -> Self {
        PosteriorModel {
            rationality: config.rationality,
            prior: config.prior,
            d_states: config.d_states,
            r_max: config.r_max,
        }
    }

    /// Log-likelihood of one trace under a Boltzmann-rational policy plus the transition term.
    ///
    /// Accumulation stops after the first visit to the goal state.
    pub fn trace_log_likelihood<M: BirlMdp>(&self, mdp: &M, trace: &[StateAction]) -> f64 {
        let q = mdp.q_values();
        let goal = mdp.goal();
        let mut normalizer = vec![0.0; mdp.num_actions()];
        let mut total = 0.0;

        for (step, sa) in trace.iter().enumerate() {
            for (action, slot) in normalizer.iter_mut().enumerate() {
                *slot = q[(sa.state, action)] * self.rationality;
            }
            total += q[(sa.state, sa.action)] * self.rationality - log_sum_exp(&normalizer);

            if let Some(next) = trace.get(step + 1) {
                let prob = mdp
                    .transition_probability(sa.state, sa.action, next.state)
                    .max(TRANSITION_PROB_FLOOR);
                total += prob.ln();
            }

            if sa.state == goal {
                break;
            }
        }

        total
    }

    /// Unnormalised log-posterior of `sample` given the current environment state.
    ///
    /// The environments must already hold the policy and Q table that belong to `sample`.
    pub fn compute_log_posterior<M: BirlMdp>(
        &self,
        mdps: &[M],
        demos: &DemonstrationSet,
        sample: &Sample,
    ) -> Result<f64, BirlError> {
        let likelihood: f64 = demos
            .iter()
            .map(|(demo, trace)| self.trace_log_likelihood(&mdps[demo.env.index()], trace))
            .sum();

        let reward_prior = reward_log_prior(self.prior, self.d_states, self.r_max)?;
        Ok(likelihood
            + reward_prior
            + tpweights_log_prior(&sample.weights)
            + beta_log_prior(sample.beta))
    }
}
