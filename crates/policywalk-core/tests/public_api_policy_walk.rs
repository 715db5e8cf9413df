use ndarray::{Array1, Array2, array};
use policywalk_core::{
    BirlConfig, BirlMdp, CommitScope, Demonstration, DemonstrationSet, RewardVector, StateAction,
    Trajectory, TransitionWeights, birl, policy_walk,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Two cells: from the start, action 0 waits and action 1 steps onto the goal.
#[derive(Debug, Clone)]
struct Corridor {
    rewards: Array1<f64>,
    policy: Vec<usize>,
    q: Array2<f64>,
    start: usize,
}

const GAMMA: f64 = 0.5;

impl Corridor {
    fn new() -> Self {
        Corridor {
            rewards: Array1::zeros(2),
            policy: vec![0, 0],
            q: Array2::zeros((2, 2)),
            start: 0,
        }
    }
}

impl BirlMdp for Corridor {
    fn update_rewards(&mut self, reward: &RewardVector) {
        self.rewards = reward.clone();
    }

    fn update_tp(&mut self, _weights: &TransitionWeights, _beta: f64) {}

    fn update_policy(&mut self, _use_policy: bool) {
        let wait = self.rewards[0] / (1.0 - GAMMA);
        let go = self.rewards[0] + GAMMA * self.rewards[1];
        self.policy[0] = if go > wait { 1 } else { 0 };
        self.do_policy_q_evaluation();
    }

    fn do_policy_q_evaluation(&mut self) {
        let goal = self.rewards[1];
        let v0 = if self.policy[0] == 1 {
            self.rewards[0] + GAMMA * goal
        } else {
            self.rewards[0] / (1.0 - GAMMA)
        };
        self.q = array![
            [self.rewards[0] + GAMMA * v0, self.rewards[0] + GAMMA * goal],
            [goal, goal]
        ];
    }

    fn policy(&self) -> &[usize] {
        &self.policy
    }

    fn q_values(&self) -> &Array2<f64> {
        &self.q
    }

    fn transition_probability(&self, state: usize, action: usize, next_state: usize) -> f64 {
        let next = if state == 0 && action == 1 { 1 } else { state };
        if next == next_state { 1.0 } else { 0.0 }
    }

    fn num_states(&self) -> usize {
        2
    }

    fn num_actions(&self) -> usize {
        2
    }

    fn reward_len(&self) -> usize {
        2
    }

    fn goal(&self) -> usize {
        1
    }

    fn commit(&mut self, proposal: &Self, scope: CommitScope) {
        self.rewards = proposal.rewards.clone();
        if scope == CommitScope::RewardAndPolicy {
            self.policy = proposal.policy.clone();
        }
    }

    fn restore(&mut self) {
        self.start = 0;
    }

    fn set_start(&mut self, start: usize) {
        self.start = start;
    }

    fn get_trajectories(&mut self) -> Trajectory {
        let mut steps = vec![StateAction::new(self.start, self.policy[self.start])];
        let mut total_return = self.rewards[self.start];
        if self.start == 0 && self.policy[0] == 1 {
            steps.push(StateAction::new(1, self.policy[1]));
            total_return += self.rewards[1];
        }
        Trajectory {
            steps,
            total_return,
        }
    }
}

fn demonstrations() -> DemonstrationSet {
    DemonstrationSet::new(
        vec![Demonstration::new(0, 0); 3],
        vec![vec![StateAction::new(0, 1), StateAction::new(1, 0)]; 3],
    )
    .expect("demonstrations should be valid")
}

fn config() -> BirlConfig {
    BirlConfig {
        iterations: 60,
        burn_in: 20,
        sample_freq: 4,
        d_states: 2,
        seed: 11,
        ..BirlConfig::default()
    }
}

#[test]
fn public_policy_walk_records_lattice_samples() {
    let mut mdps = vec![Corridor::new()];
    let mut rng = ChaCha8Rng::seed_from_u64(3);

    let run = policy_walk(&mut mdps, &demonstrations(), &config(), &mut rng)
        .expect("policy walk should succeed");

    assert_eq!(run.samples.len(), 10);
    assert_eq!(run.sample_iterations.first(), Some(&20));
    assert!(run.accepted_count <= run.iterations);
    for sample in &run.samples {
        for &value in sample.reward.iter() {
            assert!((-1.0..=1.0).contains(&value));
            assert!(((value / 0.5).round() * 0.5 - value).abs() < 1e-9);
        }
    }
}

#[test]
fn public_birl_scores_held_out_demonstrations() {
    let mut mdps = vec![Corridor::new()];
    let truth = array![0.0, 1.0];

    let report = birl(
        &mut mdps,
        &config(),
        &demonstrations(),
        &demonstrations(),
        Some(&truth),
    )
    .expect("birl should succeed");

    assert_eq!(report.samples.len(), 10);
    assert_eq!(report.ground_truth_sor, Some(1.0));
    assert!(report.sor.mean >= -2.0 && report.sor.mean <= 2.0);
    assert!(report.beta.std >= 0.0);
}

#[test]
fn public_birl_rejects_out_of_range_environment() {
    let mut mdps = vec![Corridor::new()];
    let demos = DemonstrationSet::new(
        vec![Demonstration::new(0, 1)],
        vec![vec![StateAction::new(0, 1)]],
    )
    .expect("shape is valid");

    let result = birl(&mut mdps, &config(), &demos, &demos, None);
    assert!(result.is_err());
}
