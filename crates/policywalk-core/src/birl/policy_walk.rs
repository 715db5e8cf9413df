use rand::Rng;
use tracing::{debug, info};

use crate::birl::{
    config::BirlConfig,
    demos::DemonstrationSet,
    error::BirlError,
    mdp::{BirlMdp, CommitScope, check_reward_len},
    optimality::suboptimal,
    params::{Sample, select_random_reward, select_random_tpbeta, select_random_tpweights},
    posterior::{PosteriorModel, acceptance_probability},
    proposal::mcmc_step,
};

/// Per-iteration metrics emitted by PolicyWalk.
#[derive(Debug, Clone, Copy)]
pub struct IterationMetrics {
    pub iteration: usize,
    /// The proposal's inherited policy was no longer greedy and had to be re-optimised.
    pub suboptimal: bool,
    pub accepted: bool,
    pub post_orig: f64,
    pub post_new: f64,
    pub acceptance_probability: f64,
}

/// Output of a complete PolicyWalk chain.
#[derive(Debug, Clone)]
pub struct PolicyWalkRun {
    /// Accepted parameters recorded after burn-in, in iteration order.
    pub samples: Vec<Sample>,
    /// Iteration index at which each sample was recorded.
    pub sample_iterations: Vec<usize>,
    pub iterations: usize,
    pub suboptimal_count: usize,
    pub accepted_count: usize,
}

impl PolicyWalkRun {
    fn new(iterations: usize) -> Self {
        PolicyWalkRun {
            samples: Vec::new(),
            sample_iterations: Vec::new(),
            iterations,
            suboptimal_count: 0,
            accepted_count: 0,
        }
    }

    fn record(&mut self, iteration: usize, sample: &Sample) {
        self.sample_iterations.push(iteration);
        self.samples.push(sample.clone());
    }

    /// Fraction of proposals that were accepted.
    pub fn acceptance_rate(&self) -> f64 {
        if self.iterations == 0 {
            0.0
        } else {
            self.accepted_count as f64 / self.iterations as f64
        }
    }
}

/// Run PolicyWalk over `mdps` for `config.iterations` steps.
pub fn policy_walk<M, R>(
    mdps: &mut [M],
    demos: &DemonstrationSet,
    config: &BirlConfig,
    rng: &mut R,
) -> Result<PolicyWalkRun, BirlError>
where
    M: BirlMdp,
    R: Rng + ?Sized,
{
    policy_walk_with_hook(mdps, demos, config, rng, |_| {})
}

/// Run PolicyWalk and invoke a callback after each completed iteration.
///
/// `mdps` holds the accepted environment state throughout; every proposal is evaluated on a
/// full copy and only the fields chosen by the accept rule are committed back.
pub fn policy_walk_with_hook<M, R, FHook>(
    mdps: &mut [M],
    demos: &DemonstrationSet,
    config: &BirlConfig,
    rng: &mut R,
    mut on_iteration: FHook,
) -> Result<PolicyWalkRun, BirlError>
where
    M: BirlMdp,
    R: Rng + ?Sized,
    FHook: FnMut(&IterationMetrics),
{
    config.validate()?;
    demos.validate_for(mdps)?;

    let model = PosteriorModel::from_config(config);
    let envs = demos.unique_envs();
    check_reward_len(mdps, &envs, config.d_states)?;

    let mut current = Sample {
        reward: select_random_reward(config.d_states, config.step_size, config.r_max, rng),
        weights: select_random_tpweights(config.step_size, rng),
        beta: select_random_tpbeta(rng),
    };

    info!(
        environments = envs.len(),
        demonstrations = demos.len(),
        iterations = config.iterations,
        "computing initial policies"
    );
    for env in &envs {
        let mdp = &mut mdps[env.index()];
        mdp.update_rewards(&current.reward);
        mdp.update_tp(&current.weights, current.beta);
        mdp.update_policy(false);
        mdp.do_policy_q_evaluation();
    }

    let mut post_orig: Option<f64> = None;
    let mut run = PolicyWalkRun::new(config.iterations);

    for iteration in 0..config.iterations {
        let mut proposed = mdps.to_vec();
        let candidate = mcmc_step(
            &current,
            &mut proposed,
            &envs,
            config.step_size,
            config.r_max,
            rng,
        );
        for env in &envs {
            proposed[env.index()].do_policy_q_evaluation();
        }

        let orig = match post_orig {
            Some(value) => value,
            None => {
                let value = model.compute_log_posterior(mdps, demos, &current)?;
                post_orig = Some(value);
                value
            }
        };

        let is_suboptimal = suboptimal(&proposed, &envs);
        let scope = if is_suboptimal {
            run.suboptimal_count += 1;
            for env in &envs {
                let mdp = &mut proposed[env.index()];
                mdp.update_policy(true);
                mdp.do_policy_q_evaluation();
            }
            CommitScope::RewardAndPolicy
        } else {
            CommitScope::RewardOnly
        };

        let post_new = model.compute_log_posterior(&proposed, demos, &candidate)?;
        let probability = acceptance_probability(post_new - orig);
        let accepted = rng.gen_bool(probability);

        if accepted {
            for env in &envs {
                mdps[env.index()].commit(&proposed[env.index()], scope);
            }
            post_orig = Some(post_new);
            current = candidate;
            run.accepted_count += 1;
        }

        if iteration >= config.burn_in && iteration % config.sample_freq == 0 {
            run.record(iteration, &current);
        }

        debug!(
            iteration,
            suboptimal = is_suboptimal,
            accepted,
            post_orig = orig,
            post_new,
            probability,
            "policy walk iteration"
        );
        on_iteration(&IterationMetrics {
            iteration,
            suboptimal: is_suboptimal,
            accepted,
            post_orig: orig,
            post_new,
            acceptance_probability: probability,
        });
    }

    info!(
        samples = run.samples.len(),
        suboptimal = run.suboptimal_count,
        acceptance_rate = run.acceptance_rate(),
        "policy walk finished"
    );

    Ok(run)
}
