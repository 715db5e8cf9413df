use std::f64::consts::PI;

use ndarray::array;

use super::chain::ChainMdp;
use crate::{
    BirlError, BirlMdp, Demonstration, DemonstrationSet, PosteriorModel, PriorKind, Sample,
    StateAction, TPWEIGHT_PRIOR_VARIANCE, TransitionWeights, beta_log_prior, log_sum_exp,
    reward_log_prior, tpweights_log_prior,
};

fn model() -> PosteriorModel {
    PosteriorModel {
        rationality: 1.0,
        prior: PriorKind::Uniform,
        d_states: 2,
        r_max: 1.0,
    }
}

fn solved_chain() -> ChainMdp {
    let mut mdp = ChainMdp::new(2);
    mdp.update_rewards(&array![0.0, 1.0]);
    mdp.update_policy(false);
    mdp.do_policy_q_evaluation();
    mdp
}

fn demos() -> DemonstrationSet {
    DemonstrationSet::new(
        vec![Demonstration::new(0, 0)],
        vec![vec![StateAction::new(0, 1), StateAction::new(1, 0)]],
    )
    .expect("valid demos")
}

fn sample() -> Sample {
    Sample {
        reward: array![0.0, 1.0],
        weights: TransitionWeights::canonical(),
        beta: 100.0,
    }
}

#[test]
fn uniform_reward_prior_has_closed_form() {
    let value = reward_log_prior(PriorKind::Uniform, 3, 1.0).expect("uniform is supported");
    assert_eq!(value, -3.0 * 2.0_f64.ln());
}

#[test]
fn unsupported_reward_prior_is_an_error() {
    let err = reward_log_prior(PriorKind::Laplace, 3, 1.0).expect_err("must fail");
    assert!(matches!(err, BirlError::UnsupportedPrior { .. }));
}

#[test]
fn weight_prior_peaks_at_canonical_templates() {
    let canonical = TransitionWeights::canonical();
    let per_direction = canonical.flattened().len() as f64 / 4.0;
    let expected = 4.0 * (-0.5 * per_direction * (2.0 * PI * TPWEIGHT_PRIOR_VARIANCE).ln());
    assert!((tpweights_log_prior(&canonical) - expected).abs() < 1e-9);

    let shifted = canonical.map(|_, entry| entry.mapv(|w| w + 0.5));
    assert!(tpweights_log_prior(&shifted) < tpweights_log_prior(&canonical));
}

#[test]
fn beta_prior_is_standard_normal_around_one_hundred() {
    assert!((beta_log_prior(100.0) + 0.5 * (2.0 * PI).ln()).abs() < 1e-12);
    assert!((beta_log_prior(102.0) - beta_log_prior(98.0)).abs() < 1e-12);
    assert!(beta_log_prior(105.0) < beta_log_prior(101.0));
}

#[test]
fn log_sum_exp_is_stable() {
    assert!((log_sum_exp(&[0.0, 0.0]) - 2.0_f64.ln()).abs() < 1e-12);
    assert!((log_sum_exp(&[1000.0, 1000.0]) - (1000.0 + 2.0_f64.ln())).abs() < 1e-9);
    assert_eq!(log_sum_exp(&[f64::NEG_INFINITY]), f64::NEG_INFINITY);
}

#[test]
fn trace_likelihood_matches_boltzmann_policy() {
    let mdp = solved_chain();
    let q = mdp.q_values().clone();
    let expected = q[(0, 1)] - log_sum_exp(&[q[(0, 0)], q[(0, 1)]]) + q[(1, 0)]
        - log_sum_exp(&[q[(1, 0)], q[(1, 1)]]);

    let demos = demos();
    let trace = &demos.traces()[0];
    let value = model().trace_log_likelihood(&mdp, trace);
    assert!((value - expected).abs() < 1e-12);
    assert!((q[(0, 1)] - 0.9).abs() < 1e-9);
}

#[test]
fn impossible_transition_is_floored_not_infinite() {
    let mdp = solved_chain();
    let trace = vec![StateAction::new(0, 0), StateAction::new(1, 0)];
    let value = model().trace_log_likelihood(&mdp, &trace);
    assert!(value.is_finite());
    assert!(value < -30.0);
}

#[test]
fn accumulation_stops_at_goal() {
    let mdp = solved_chain();
    let to_goal = vec![StateAction::new(0, 1), StateAction::new(1, 0)];
    let past_goal = vec![
        StateAction::new(0, 1),
        StateAction::new(1, 0),
        StateAction::new(0, 0),
    ];
    let short = model().trace_log_likelihood(&mdp, &to_goal);
    let long = model().trace_log_likelihood(&mdp, &past_goal);
    // The step leaving the goal only adds its transition term before stopping.
    assert!(long <= short);
    assert!((long - short).abs() > 1.0);
}

#[test]
fn posterior_is_deterministic() {
    let mdps = vec![solved_chain()];
    let first = model()
        .compute_log_posterior(&mdps, &demos(), &sample())
        .expect("posterior");
    let second = model()
        .compute_log_posterior(&mdps, &demos(), &sample())
        .expect("posterior");
    assert_eq!(first, second);
}

#[test]
fn posterior_sums_likelihood_and_priors() {
    let mdps = vec![solved_chain()];
    let likelihood = model().trace_log_likelihood(&mdps[0], &demos().traces()[0]);
    let expected = likelihood
        + reward_log_prior(PriorKind::Uniform, 2, 1.0).expect("uniform")
        + tpweights_log_prior(&sample().weights)
        + beta_log_prior(sample().beta);
    let value = model()
        .compute_log_posterior(&mdps, &demos(), &sample())
        .expect("posterior");
    assert!((value - expected).abs() < 1e-12);
}
