use rand::Rng;

use crate::birl::{
    grid::{random_direction, step_clamped},
    ids::EnvId,
    mdp::BirlMdp,
    params::Sample,
    prior::{BETA_MAX, BETA_MIN},
};

/// Step applied to beta on every proposal.
pub const BETA_STEP: f64 = 1.0;

/// Propose a grid neighbour of `current` and push it into the working environments.
///
/// Every reward coordinate and every transition weight moves by an independent `±step_size`
/// and is clamped to `[-r_max, r_max]`; beta moves by `±BETA_STEP` inside
/// `[BETA_MIN, BETA_MAX]`. Each direction steps from its own current matrix.
///
/// Policies and Q tables in `working` are stale afterwards until re-evaluated.
pub fn mcmc_step<M, R>(
    current: &Sample,
    working: &mut [M],
    envs: &[EnvId],
    step_size: f64,
    r_max: f64,
    rng: &mut R,
) -> Sample
where
    M: BirlMdp,
    R: Rng + ?Sized,
{
    let reward = step_clamped(&current.reward, step_size, r_max, rng);
    let weights = current
        .weights
        .map(|_, entry| step_clamped(entry, step_size, r_max, rng));
    let beta = (current.beta + random_direction(rng) * BETA_STEP).clamp(BETA_MIN, BETA_MAX);

    for env in envs {
        let mdp = &mut working[env.index()];
        mdp.update_rewards(&reward);
        mdp.update_tp(&weights, beta);
    }

    Sample {
        reward,
        weights,
        beta,
    }
}
