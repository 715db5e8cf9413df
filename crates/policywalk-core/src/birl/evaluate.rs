use ndarray::Array1;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::info;

use crate::birl::{
    config::BirlConfig,
    demos::DemonstrationSet,
    error::BirlError,
    mdp::{BirlMdp, check_reward_len},
    params::{RewardVector, Sample, TransitionWeights},
    policy_walk::policy_walk,
    prior::BETA_PRIOR_MEAN,
    stats::{Moments, RunningMoments},
};

/// Summary of a BIRL run scored on held-out demonstrations.
#[derive(Debug, Clone)]
pub struct BirlReport {
    /// Moments of the per-sample average held-out return.
    pub sor: Moments,
    /// Mean flattened transition-weight vector, concatenated with itself.
    pub weights_mean: Array1<f64>,
    /// Moments of the sampled transition temperature.
    pub beta: Moments,
    pub samples: Vec<Sample>,
    pub suboptimal_count: usize,
    pub accepted_count: usize,
    /// Held-out score of the ground-truth reward under prior-mean dynamics, when supplied.
    pub ground_truth_sor: Option<f64>,
}

/// Average held-out return for each sample.
///
/// Every environment referenced by `demos` is re-parameterised with the sample and re-solved,
/// then one trajectory is rolled out per demonstration start.
pub fn get_expected_sor<M: BirlMdp>(
    samples: &[Sample],
    mdps: &mut [M],
    demos: &DemonstrationSet,
) -> Result<Vec<f64>, BirlError> {
    demos.validate_for(mdps)?;
    let envs = demos.unique_envs();

    let mut cum_rewards = Vec::with_capacity(samples.len());
    for sample in samples {
        check_reward_len(mdps, &envs, sample.reward.len())?;
        for env in &envs {
            let mdp = &mut mdps[env.index()];
            mdp.update_rewards(&sample.reward);
            mdp.update_tp(&sample.weights, sample.beta);
            mdp.update_policy(false);
        }

        let mut reward_sum = 0.0;
        for demo in demos.list() {
            let mdp = &mut mdps[demo.env.index()];
            mdp.restore();
            mdp.set_start(demo.start);
            reward_sum += mdp.get_trajectories().total_return;
        }
        cum_rewards.push(reward_sum / demos.len() as f64);
    }
    Ok(cum_rewards)
}

/// Run PolicyWalk on `demos` and score the resulting chain on `test_demos`.
///
/// When `ground_truth` is supplied it is scored the same way, paired with the canonical
/// transition weights and the prior-mean beta.
pub fn birl<M: BirlMdp>(
    mdps: &mut [M],
    config: &BirlConfig,
    demos: &DemonstrationSet,
    test_demos: &DemonstrationSet,
    ground_truth: Option<&RewardVector>,
) -> Result<BirlReport, BirlError> {
    config.validate()?;
    test_demos.validate_for(mdps)?;

    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    let run = policy_walk(mdps, demos, config, &mut rng)?;
    if run.samples.is_empty() {
        return Err(BirlError::NoSamples);
    }

    let sor: RunningMoments = get_expected_sor(&run.samples, mdps, test_demos)?
        .into_iter()
        .collect();
    let beta: RunningMoments = run.samples.iter().map(|sample| sample.beta).collect();

    let mut weights_sum = run.samples[0].weights.flattened();
    for sample in &run.samples[1..] {
        weights_sum += &sample.weights.flattened();
    }
    let weights_mean = weights_sum / run.samples.len() as f64;
    let weights_mean: Array1<f64> = weights_mean
        .iter()
        .chain(weights_mean.iter())
        .copied()
        .collect();

    let ground_truth_sor = match ground_truth {
        Some(reward) => {
            let reference = Sample {
                reward: reward.clone(),
                weights: TransitionWeights::canonical(),
                beta: BETA_PRIOR_MEAN,
            };
            get_expected_sor(&[reference], mdps, test_demos)?.first().copied()
        }
        None => None,
    };

    info!(
        samples = run.samples.len(),
        sor_mean = sor.mean(),
        sor_std = sor.std(),
        beta_mean = beta.mean(),
        "birl evaluation finished"
    );

    Ok(BirlReport {
        sor: sor.moments(),
        weights_mean,
        beta: beta.moments(),
        samples: run.samples,
        suboptimal_count: run.suboptimal_count,
        accepted_count: run.accepted_count,
        ground_truth_sor,
    })
}
