use policywalk_core::{StateAction, Trajectory};
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::{GridMdp, ReturnType};

#[derive(Debug, Clone)]
/// Seeded simulator over a compiled grid.
pub struct GridSimulator {
    mdp: GridMdp,
    rng: ChaCha8Rng,
}

impl GridSimulator {
    /// Create a simulator with deterministic RNG seed.
    pub fn new(mdp: GridMdp, seed: u64) -> Self {
        Self {
            mdp,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Borrow the underlying grid.
    pub fn mdp(&self) -> &GridMdp {
        &self.mdp
    }

    /// Sample one `(next_state, reward, at_goal)` transition.
    /// Out-of-range inputs are treated as a no-op transition that ends the episode.
    pub fn step(&mut self, state: usize, action: usize) -> (usize, f64, bool) {
        let sample = uniform_sample(&mut self.rng);
        match self.mdp.sample_transition(state, action, sample) {
            Some(next) => (next, self.mdp.reward(next), next == self.mdp.goal_state()),
            None => (state, 0.0, true),
        }
    }

    /// Follow the grid's current policy from `start`.
    pub fn rollout(&mut self, start: usize) -> Trajectory {
        rollout(&self.mdp, &mut self.rng, start)
    }
}

/// Uniform sample in `[0, 1)` built from the raw 64-bit output.
pub(crate) fn uniform_sample(rng: &mut ChaCha8Rng) -> f64 {
    (rng.next_u64() as f64) / ((u64::MAX as f64) + 1.0)
}

/// Roll out the current policy until the goal is recorded or the horizon is reached.
///
/// Each visited state contributes its reward, discounted by `gamma^t` for
/// [`ReturnType::Discounted`].
pub(crate) fn rollout(mdp: &GridMdp, rng: &mut ChaCha8Rng, start: usize) -> Trajectory {
    let mut steps = Vec::new();
    let mut total_return = 0.0;
    let mut discount = 1.0;
    let mut state = start;
    if start >= mdp.rewards().len() {
        return Trajectory {
            steps,
            total_return,
        };
    }

    for _ in 0..mdp.horizon() {
        let action = mdp.policy_action(state);
        steps.push(StateAction::new(state, action));
        total_return += discount * mdp.reward(state);
        if state == mdp.goal_state() {
            break;
        }

        let sample = uniform_sample(rng);
        let Some(next) = mdp.sample_transition(state, action, sample) else {
            break;
        };
        state = next;
        if mdp.return_type() == ReturnType::Discounted {
            discount *= mdp.gamma();
        }
    }

    Trajectory {
        steps,
        total_return,
    }
}
