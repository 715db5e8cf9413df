use ndarray::{Array1, Array2};
use policywalk_core::{
    BETA_PRIOR_MEAN, BirlMdp, CommitScope, Direction, RewardVector, StateAction, Trajectory,
    TransitionWeights, move_column,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, warn};

use crate::{Cell, GridError, GridSpec, ReturnType, simulator::rollout};

/// Minimum Q-value gain before policy improvement switches action.
pub const POLICY_EPSILON: f64 = 1e-10;
/// Cap on Gauss-Seidel sweeps during one policy evaluation.
pub const MAX_EVALUATION_SWEEPS: usize = 10_000;
const EVALUATION_TOLERANCE: f64 = 1e-9;
const MAX_POLICY_ITERATIONS: usize = 1_000;

#[derive(Debug, Clone)]
struct ActionRec {
    outcomes: Vec<OutcomeRec>,
    cdf: Vec<f64>,
}

#[derive(Debug, Clone, Copy)]
struct OutcomeRec {
    next: usize,
    prob: f64,
}

impl ActionRec {
    fn deterministic(next: usize) -> Self {
        ActionRec {
            outcomes: vec![OutcomeRec { next, prob: 1.0 }],
            cdf: vec![1.0],
        }
    }

    fn expected(&self, values: &Array1<f64>) -> f64 {
        self.outcomes
            .iter()
            .map(|outcome| outcome.prob * values[outcome.next])
            .sum()
    }
}

#[derive(Debug, Clone)]
/// Runtime grid world with a weight-parameterised transition model.
///
/// States are cells in row-major order and actions are the four [`Direction`]s.
pub struct GridMdp {
    rows: usize,
    cols: usize,
    goal: usize,
    start: usize,
    initial_start: usize,
    walls: Vec<bool>,
    slippery: Vec<bool>,
    features: Vec<usize>,
    num_features: usize,
    gamma: f64,
    horizon: usize,
    return_type: ReturnType,
    seed: u64,
    rng: ChaCha8Rng,
    rewards: Array1<f64>,
    // Indexed by `state * 4 + action`.
    transitions: Vec<ActionRec>,
    policy: Vec<usize>,
    values: Array1<f64>,
    q: Array2<f64>,
}

impl GridMdp {
    /// Compile and validate a spec into a solved grid.
    ///
    /// The fresh grid uses zero rewards, the canonical transition weights at the prior-mean
    /// temperature, and the policy that goes with them.
    pub(crate) fn from_spec(spec: &GridSpec) -> Result<Self, GridError> {
        spec.validate()?;

        let num_states = spec.cell_count();
        let index = |cell: Cell| cell[0] * spec.cols + cell[1];

        let mut walls = vec![false; num_states];
        for &cell in &spec.walls {
            walls[index(cell)] = true;
        }
        let mut slippery = vec![false; num_states];
        for &cell in &spec.slippery {
            slippery[index(cell)] = true;
        }
        let features = match &spec.features {
            Some(rows) => rows.iter().flatten().copied().collect(),
            None => (0..num_states).collect(),
        };

        let mut mdp = GridMdp {
            rows: spec.rows,
            cols: spec.cols,
            goal: index(spec.goal),
            start: index(spec.start),
            initial_start: index(spec.start),
            walls,
            slippery,
            features,
            num_features: spec.feature_count(),
            gamma: spec.gamma,
            horizon: spec.horizon,
            return_type: spec.return_type,
            seed: spec.seed,
            rng: ChaCha8Rng::seed_from_u64(spec.seed),
            rewards: Array1::zeros(num_states),
            transitions: Vec::with_capacity(num_states * Direction::ALL.len()),
            policy: vec![0; num_states],
            values: Array1::zeros(num_states),
            q: Array2::zeros((num_states, Direction::ALL.len())),
        };
        mdp.update_tp(&TransitionWeights::canonical(), BETA_PRIOR_MEAN);
        mdp.update_policy(false);
        Ok(mdp)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Row-major state index of a cell.
    pub fn state_of(&self, row: usize, col: usize) -> usize {
        row * self.cols + col
    }

    /// Cell of a state index.
    pub fn cell_of(&self, state: usize) -> Cell {
        [state / self.cols, state % self.cols]
    }

    /// Length of the reward vector this grid consumes.
    pub fn num_features(&self) -> usize {
        self.num_features
    }

    pub fn goal_state(&self) -> usize {
        self.goal
    }

    /// Current rollout start.
    pub fn start(&self) -> usize {
        self.start
    }

    pub fn gamma(&self) -> f64 {
        self.gamma
    }

    pub fn horizon(&self) -> usize {
        self.horizon
    }

    pub fn return_type(&self) -> ReturnType {
        self.return_type
    }

    pub fn is_wall(&self, state: usize) -> bool {
        self.walls.get(state).copied().unwrap_or(false)
    }

    /// Per-state reward induced by the last reward vector.
    pub fn rewards(&self) -> &Array1<f64> {
        &self.rewards
    }

    pub fn values(&self) -> &Array1<f64> {
        &self.values
    }

    pub(crate) fn reward(&self, state: usize) -> f64 {
        self.rewards[state]
    }

    pub(crate) fn policy_action(&self, state: usize) -> usize {
        self.policy[state]
    }

    /// Record an expert trace from `start` under the current policy.
    ///
    /// Uses the grid's rollout RNG, so repeated calls continue the same random stream.
    pub fn demonstrate(&mut self, start: usize) -> Vec<StateAction> {
        let mut rng = self.rng.clone();
        let trajectory = rollout(self, &mut rng, start);
        self.rng = rng;
        trajectory.steps
    }

    /// Pick a successor of `(state, action)` using a uniform sample in `[0, 1)`.
    pub(crate) fn sample_transition(&self, state: usize, action: usize, sample: f64) -> Option<usize> {
        if action >= Direction::ALL.len() {
            return None;
        }
        let rec = self.transitions.get(state * Direction::ALL.len() + action)?;

        let mut chosen_idx = rec.cdf.partition_point(|p| *p < sample);
        if chosen_idx >= rec.outcomes.len() {
            chosen_idx = rec.outcomes.len() - 1;
        }
        Some(rec.outcomes[chosen_idx].next)
    }

    fn neighbour(&self, state: usize, direction: Direction) -> usize {
        let [row, col] = self.cell_of(state);
        let (d_row, d_col) = direction.delta();
        let (Some(row), Some(col)) = (row.checked_add_signed(d_row), col.checked_add_signed(d_col))
        else {
            return state;
        };
        if row >= self.rows || col >= self.cols {
            return state;
        }
        let next = self.state_of(row, col);
        if self.walls[next] { state } else { next }
    }

    fn action_rec(&self, state: usize, action: usize) -> &ActionRec {
        &self.transitions[state * Direction::ALL.len() + action]
    }

    /// Iterative policy evaluation; the goal keeps its own reward as value.
    fn evaluate_values(&mut self) {
        for sweep in 0..MAX_EVALUATION_SWEEPS {
            let mut max_delta = 0.0_f64;
            for state in 0..self.values.len() {
                let value = if state == self.goal {
                    self.rewards[state]
                } else {
                    let expected = self.action_rec(state, self.policy[state]).expected(&self.values);
                    self.rewards[state] + self.gamma * expected
                };
                max_delta = max_delta.max((value - self.values[state]).abs());
                self.values[state] = value;
            }
            if max_delta < EVALUATION_TOLERANCE {
                return;
            }
            if sweep + 1 == MAX_EVALUATION_SWEEPS {
                warn!(
                    sweeps = MAX_EVALUATION_SWEEPS,
                    max_delta, "policy evaluation hit the sweep cap before converging"
                );
            }
        }
    }

    fn fill_q(&mut self) {
        for state in 0..self.values.len() {
            for action in 0..Direction::ALL.len() {
                self.q[(state, action)] = if state == self.goal {
                    self.rewards[state]
                } else {
                    self.rewards[state]
                        + self.gamma * self.action_rec(state, action).expected(&self.values)
                };
            }
        }
    }
}

impl BirlMdp for GridMdp {
    /// Map each cell's feature through `reward`; features beyond its length score zero.
    fn update_rewards(&mut self, reward: &RewardVector) {
        if reward.len() != self.num_features {
            warn!(
                expected = self.num_features,
                actual = reward.len(),
                "reward vector length does not match the grid's feature count"
            );
        }
        for (state, &feature) in self.features.iter().enumerate() {
            self.rewards[state] = reward.get(feature).copied().unwrap_or(0.0);
        }
    }

    /// Softmax over the five moves of `beta * weights[action][terrain, move]`.
    ///
    /// Moves into walls or off the grid land on the current cell. Walls and the goal absorb.
    fn update_tp(&mut self, weights: &TransitionWeights, beta: f64) {
        let num_states = self.values.len();
        let mut transitions = Vec::with_capacity(num_states * Direction::ALL.len());

        for state in 0..num_states {
            let terrain = usize::from(self.slippery[state]);
            for action in Direction::ALL {
                if state == self.goal || self.walls[state] {
                    transitions.push(ActionRec::deterministic(state));
                    continue;
                }

                let matrix = &weights[action];
                let mut moves = vec![(state, beta * matrix[(terrain, 0)])];
                for direction in Direction::ALL {
                    moves.push((
                        self.neighbour(state, direction),
                        beta * matrix[(terrain, move_column(direction))],
                    ));
                }

                let max_logit = moves
                    .iter()
                    .map(|&(_, logit)| logit)
                    .fold(f64::NEG_INFINITY, f64::max);
                let normaliser: f64 = moves
                    .iter()
                    .map(|&(_, logit)| (logit - max_logit).exp())
                    .sum();

                // Merge moves that land on the same cell.
                let mut outcomes: Vec<OutcomeRec> = Vec::with_capacity(moves.len());
                for (next, logit) in moves {
                    let prob = (logit - max_logit).exp() / normaliser;
                    match outcomes.iter_mut().find(|outcome| outcome.next == next) {
                        Some(outcome) => outcome.prob += prob,
                        None => outcomes.push(OutcomeRec { next, prob }),
                    }
                }

                let mut cumulative = 0.0_f64;
                let cdf = outcomes
                    .iter()
                    .map(|outcome| {
                        cumulative += outcome.prob;
                        cumulative
                    })
                    .collect();
                transitions.push(ActionRec { outcomes, cdf });
            }
        }

        self.transitions = transitions;
    }

    fn update_policy(&mut self, use_policy: bool) {
        if !use_policy {
            self.policy.iter_mut().for_each(|action| *action = 0);
        }

        for iteration in 0..MAX_POLICY_ITERATIONS {
            self.do_policy_q_evaluation();

            let mut changed = 0;
            for state in 0..self.policy.len() {
                let current = self.policy[state];
                let row = self.q.row(state);
                let (best, best_q) = row
                    .iter()
                    .copied()
                    .enumerate()
                    .fold((current, row[current]), |acc, (action, value)| {
                        if value > acc.1 { (action, value) } else { acc }
                    });
                if best_q > row[current] + POLICY_EPSILON {
                    self.policy[state] = best;
                    changed += 1;
                }
            }

            if changed == 0 {
                debug!(iterations = iteration + 1, "policy iteration converged");
                return;
            }
        }

        warn!(
            iterations = MAX_POLICY_ITERATIONS,
            "policy iteration hit the iteration cap"
        );
        self.do_policy_q_evaluation();
    }

    fn do_policy_q_evaluation(&mut self) {
        self.evaluate_values();
        self.fill_q();
    }

    fn policy(&self) -> &[usize] {
        &self.policy
    }

    fn q_values(&self) -> &Array2<f64> {
        &self.q
    }

    fn transition_probability(&self, state: usize, action: usize, next_state: usize) -> f64 {
        if action >= Direction::ALL.len() {
            return 0.0;
        }
        self.transitions
            .get(state * Direction::ALL.len() + action)
            .map_or(0.0, |rec| {
                rec.outcomes
                    .iter()
                    .filter(|outcome| outcome.next == next_state)
                    .map(|outcome| outcome.prob)
                    .sum()
            })
    }

    fn num_states(&self) -> usize {
        self.values.len()
    }

    fn num_actions(&self) -> usize {
        Direction::ALL.len()
    }

    fn reward_len(&self) -> usize {
        self.num_features
    }

    fn goal(&self) -> usize {
        self.goal
    }

    fn commit(&mut self, proposal: &Self, scope: CommitScope) {
        self.rewards.assign(&proposal.rewards);
        if scope == CommitScope::RewardAndPolicy {
            self.policy.clone_from(&proposal.policy);
        }
    }

    /// Return to the configured start cell and reseed the rollout RNG.
    fn restore(&mut self) {
        self.start = self.initial_start;
        self.rng = ChaCha8Rng::seed_from_u64(self.seed);
    }

    fn set_start(&mut self, start: usize) {
        self.start = start;
    }

    fn get_trajectories(&mut self) -> Trajectory {
        let mut rng = self.rng.clone();
        let trajectory = rollout(self, &mut rng, self.start);
        self.rng = rng;
        trajectory
    }
}
