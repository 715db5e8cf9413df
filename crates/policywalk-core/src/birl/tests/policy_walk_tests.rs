use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use super::chain::ChainMdp;
use crate::{
    BirlConfig, BirlError, CommitScope, Demonstration, DemonstrationSet, StateAction,
    policy_walk, policy_walk_with_hook,
};

fn two_state_demos() -> DemonstrationSet {
    DemonstrationSet::new(
        vec![Demonstration::new(0, 0)],
        vec![vec![StateAction::new(0, 1), StateAction::new(1, 0)]],
    )
    .expect("valid demos")
}

fn two_state_config(iterations: usize, burn_in: usize, sample_freq: usize) -> BirlConfig {
    BirlConfig {
        step_size: 0.5,
        iterations,
        burn_in,
        sample_freq,
        r_max: 1.0,
        d_states: 2,
        rationality: 1.0,
        ..BirlConfig::default()
    }
}

#[test]
fn samples_follow_burn_in_and_stride() {
    let mut mdps = vec![ChainMdp::new(2)];
    let mut rng = ChaCha8Rng::seed_from_u64(0);
    let run = policy_walk(
        &mut mdps,
        &two_state_demos(),
        &two_state_config(100, 20, 5),
        &mut rng,
    )
    .expect("run should succeed");

    assert_eq!(run.samples.len(), 16);
    assert_eq!(
        run.sample_iterations,
        (20..100).step_by(5).collect::<Vec<_>>()
    );
    assert!(run.accepted_count <= run.iterations);
    assert!(run.suboptimal_count <= run.iterations);
}

#[test]
fn two_state_chain_samples_stay_on_reward_grid() {
    let mut mdps = vec![ChainMdp::new(2)];
    let mut rng = ChaCha8Rng::seed_from_u64(17);
    let run = policy_walk(
        &mut mdps,
        &two_state_demos(),
        &two_state_config(10, 0, 1),
        &mut rng,
    )
    .expect("run should succeed");

    let lattice = [-1.0, -0.5, 0.0, 0.5, 1.0];
    assert_eq!(run.samples.len(), 10);
    for sample in &run.samples {
        assert_eq!(sample.reward.len(), 2);
        for r in &sample.reward {
            assert!(lattice.contains(r), "reward {r} is off the lattice");
        }
        assert!((-200.0..=200.0).contains(&sample.beta));
    }
}

#[test]
fn accepted_environment_tracks_current_sample() {
    let mut mdps = vec![ChainMdp::new(2)];
    let mut rng = ChaCha8Rng::seed_from_u64(23);
    let run = policy_walk(
        &mut mdps,
        &two_state_demos(),
        &two_state_config(30, 0, 1),
        &mut rng,
    )
    .expect("run should succeed");

    let last = run.samples.last().expect("samples recorded");
    assert_eq!(mdps[0].rewards(), &last.reward);
}

#[test]
fn same_seed_reproduces_the_chain() {
    let run_once = |seed: u64| {
        let mut mdps = vec![ChainMdp::new(2)];
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        policy_walk(
            &mut mdps,
            &two_state_demos(),
            &two_state_config(25, 5, 2),
            &mut rng,
        )
        .expect("run should succeed")
    };

    let a = run_once(99);
    let b = run_once(99);
    assert_eq!(a.samples, b.samples);
    assert_eq!(a.accepted_count, b.accepted_count);
    assert_eq!(a.suboptimal_count, b.suboptimal_count);
}

#[test]
fn hook_sees_every_iteration_in_order() {
    let mut mdps = vec![ChainMdp::new(2)];
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    let mut seen = Vec::new();
    let run = policy_walk_with_hook(
        &mut mdps,
        &two_state_demos(),
        &two_state_config(12, 2, 3),
        &mut rng,
        |metrics| seen.push(*metrics),
    )
    .expect("run should succeed");

    assert_eq!(
        seen.iter().map(|m| m.iteration).collect::<Vec<_>>(),
        (0..12).collect::<Vec<_>>()
    );
    assert_eq!(
        seen.iter().filter(|m| m.accepted).count(),
        run.accepted_count
    );
    assert_eq!(
        seen.iter().filter(|m| m.suboptimal).count(),
        run.suboptimal_count
    );
    assert!(
        seen.iter()
            .all(|m| (0.0..=1.0).contains(&m.acceptance_probability))
    );
    for metrics in seen.iter().filter(|m| m.post_new >= m.post_orig) {
        assert_eq!(metrics.acceptance_probability, 1.0);
        assert!(metrics.accepted);
    }
}

#[test]
fn demonstrations_must_reference_known_environments() {
    let mut mdps = vec![ChainMdp::new(2)];
    let mut rng = ChaCha8Rng::seed_from_u64(0);
    let demos = DemonstrationSet::new(
        vec![Demonstration::new(0, 3)],
        vec![vec![StateAction::new(0, 1)]],
    )
    .expect("structurally valid");

    let err = policy_walk(&mut mdps, &demos, &two_state_config(10, 0, 1), &mut rng)
        .expect_err("must fail");
    assert!(matches!(err, BirlError::UnknownEnvironment { .. }));
}

#[test]
fn trace_steps_outside_the_environment_are_rejected() {
    let mut mdps = vec![ChainMdp::new(2)];
    let mut rng = ChaCha8Rng::seed_from_u64(0);
    let demos = DemonstrationSet::new(
        vec![Demonstration::new(0, 0)],
        vec![vec![StateAction::new(5, 1)]],
    )
    .expect("structurally valid");

    let err = policy_walk(&mut mdps, &demos, &two_state_config(10, 0, 1), &mut rng)
        .expect_err("must fail");
    assert!(matches!(
        err,
        BirlError::StepOutOfRange {
            demo: 0,
            step: 0,
            state: 5,
            ..
        }
    ));

    let demos = DemonstrationSet::new(
        vec![Demonstration::new(0, 0)],
        vec![vec![StateAction::new(0, 1), StateAction::new(1, 2)]],
    )
    .expect("structurally valid");
    let err = policy_walk(&mut mdps, &demos, &two_state_config(10, 0, 1), &mut rng)
        .expect_err("must fail");
    assert!(matches!(
        err,
        BirlError::StepOutOfRange {
            step: 1,
            action: 2,
            ..
        }
    ));
}

#[test]
fn start_state_outside_the_environment_is_rejected() {
    let mut mdps = vec![ChainMdp::new(2)];
    let mut rng = ChaCha8Rng::seed_from_u64(0);
    let demos = DemonstrationSet::new(
        vec![Demonstration::new(4, 0)],
        vec![vec![StateAction::new(0, 1)]],
    )
    .expect("structurally valid");

    let err = policy_walk(&mut mdps, &demos, &two_state_config(10, 0, 1), &mut rng)
        .expect_err("must fail");
    assert!(matches!(
        err,
        BirlError::StartOutOfRange { demo: 0, start: 4 }
    ));
}

#[test]
fn reward_length_must_match_the_environment() {
    let mut mdps = vec![ChainMdp::new(2)];
    let mut rng = ChaCha8Rng::seed_from_u64(0);
    let config = BirlConfig {
        d_states: 3,
        ..two_state_config(10, 0, 1)
    };

    let err = policy_walk(&mut mdps, &two_state_demos(), &config, &mut rng)
        .expect_err("must fail");
    assert!(matches!(
        err,
        BirlError::RewardLengthMismatch {
            expected: 2,
            actual: 3,
            ..
        }
    ));
    assert!(mdps[0].commits.is_empty());
}

#[test]
fn only_accepted_iterations_reach_the_environments() {
    // Environment 1 is never demonstrated and must stay untouched.
    let mut mdps = vec![ChainMdp::new(3), ChainMdp::new(3)];
    let mut rng = ChaCha8Rng::seed_from_u64(5);
    let demos = DemonstrationSet::new(
        vec![Demonstration::new(0, 0)],
        vec![vec![
            StateAction::new(0, 1),
            StateAction::new(1, 1),
            StateAction::new(2, 0),
        ]],
    )
    .expect("valid demos");
    let config = BirlConfig {
        step_size: 0.05,
        d_states: 3,
        ..two_state_config(80, 0, 1)
    };

    let mut seen = Vec::new();
    let run = policy_walk_with_hook(&mut mdps, &demos, &config, &mut rng, |metrics| {
        seen.push(*metrics)
    })
    .expect("run should succeed");

    let accepted: Vec<_> = seen.iter().filter(|m| m.accepted).collect();
    assert!(!accepted.is_empty());
    assert!(accepted.len() < seen.len());

    // Proposals are updated on copies; only the warm-up touches the kernel in place.
    assert_eq!(mdps[0].tp_updates, 1);
    assert_eq!(mdps[0].commits.len(), run.accepted_count);
    assert_eq!(mdps[0].commits.len(), accepted.len());
    for (metrics, (scope, policy_changed)) in accepted.iter().zip(&mdps[0].commits) {
        if metrics.suboptimal {
            assert_eq!(*scope, CommitScope::RewardAndPolicy);
        } else {
            assert_eq!(*scope, CommitScope::RewardOnly);
            assert!(!policy_changed);
        }
    }

    assert_eq!(mdps[1].tp_updates, 0);
    assert!(mdps[1].commits.is_empty());
    assert_eq!(mdps[1].rewards(), &ndarray::Array1::<f64>::zeros(3));
}
