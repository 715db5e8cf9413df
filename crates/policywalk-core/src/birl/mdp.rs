use ndarray::Array2;

use crate::birl::{
    error::BirlError,
    ids::{EnvId, StateAction},
    params::{RewardVector, TransitionWeights},
};

/// Which fields an accepted proposal copies back into the accepted environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitScope {
    /// The old policy stayed greedy, so only the reward model changes.
    RewardOnly,
    /// The proposal was re-optimised; reward model and policy both change.
    RewardAndPolicy,
}

/// A rolled-out trajectory and the return the environment realised along it.
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    pub steps: Vec<StateAction>,
    pub total_return: f64,
}

/// Environment interface consumed by the sampler and the evaluation harness.
///
/// Implementations own their reward model, transition model, policy and Q table. The sampler
/// snapshots whole collections with `Clone` and merges accepted proposals back through
/// [`BirlMdp::commit`].
pub trait BirlMdp: Clone {
    /// Replace the reward function with the one induced by `reward`.
    fn update_rewards(&mut self, reward: &RewardVector);

    /// Rebuild the transition model from directional weights and temperature `beta`.
    fn update_tp(&mut self, weights: &TransitionWeights, beta: f64);

    /// Run policy iteration, warm-starting from the current policy when `use_policy` is set.
    fn update_policy(&mut self, use_policy: bool);

    /// Refresh the Q table for the current policy, reward and transition model.
    fn do_policy_q_evaluation(&mut self);

    /// One action index per state.
    fn policy(&self) -> &[usize];

    /// Q table shaped `states x actions`.
    fn q_values(&self) -> &Array2<f64>;

    fn transition_probability(&self, state: usize, action: usize, next_state: usize) -> f64;

    fn num_states(&self) -> usize;

    fn num_actions(&self) -> usize;

    /// Length of the reward vector `update_rewards` expects.
    fn reward_len(&self) -> usize;

    fn goal(&self) -> usize;

    /// Copy the fields selected by `scope` from `proposal` into `self`.
    fn commit(&mut self, proposal: &Self, scope: CommitScope);

    /// Reset rollout state to the environment's initial configuration.
    fn restore(&mut self);

    fn set_start(&mut self, start: usize);

    /// Roll out the current policy from the start state.
    fn get_trajectories(&mut self) -> Trajectory;
}

/// Fail unless every environment in `envs` consumes reward vectors of length `len`.
pub(crate) fn check_reward_len<M: BirlMdp>(
    mdps: &[M],
    envs: &[EnvId],
    len: usize,
) -> Result<(), BirlError> {
    for &env in envs {
        let expected = mdps[env.index()].reward_len();
        if expected != len {
            return Err(BirlError::RewardLengthMismatch {
                env,
                expected,
                actual: len,
            });
        }
    }
    Ok(())
}
