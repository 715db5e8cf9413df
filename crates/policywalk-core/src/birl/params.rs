use std::ops::{Index, IndexMut};

use ndarray::{Array1, Array2};
use rand::Rng;
use rand_distr::{Distribution, StandardNormal, Uniform};
use serde::{Deserialize, Serialize};

use crate::birl::{
    grid::{flatten, stick_array_to_grid, stick_to_grid},
    ids::Direction,
    prior::{BETA_MAX, BETA_MIN, BETA_PRIOR_MEAN, BETA_PRIOR_STD, TPWEIGHT_PRIOR_VARIANCE},
};

/// Reward weights, one per feature dimension.
pub type RewardVector = Array1<f64>;

/// Rows of a transition-weight matrix: one per terrain kind.
pub const TERRAIN_KINDS: usize = 2;
/// Columns of a transition-weight matrix: stay, then one move per `Direction`.
pub const MOVE_KINDS: usize = 5;
/// Grid spacing used when drawing the initial beta.
pub const BETA_GRID_STEP: f64 = 5.0;

/// Column of a transition-weight matrix that scores moving in `direction`.
pub fn move_column(direction: Direction) -> usize {
    direction.index() + 1
}

/// Prior mean of the weight matrix for `direction`.
///
/// On open terrain the intended neighbour scores `+1` and the reverse move `-1`.
/// On slippery terrain staying put scores as high as the intended move.
pub fn canonical_template(direction: Direction) -> Array2<f64> {
    let mut template = Array2::zeros((TERRAIN_KINDS, MOVE_KINDS));
    let intended = move_column(direction);
    let reverse = move_column(direction.reverse());
    for terrain in 0..TERRAIN_KINDS {
        template[(terrain, intended)] = 1.0;
        template[(terrain, reverse)] = -1.0;
    }
    template[(1, 0)] = 1.0;
    template
}

/// Directional transition weights: one `TERRAIN_KINDS x MOVE_KINDS` matrix per direction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionWeights {
    entries: [Array2<f64>; 4],
}

impl TransitionWeights {
    pub fn new(right: Array2<f64>, up: Array2<f64>, left: Array2<f64>, down: Array2<f64>) -> Self {
        TransitionWeights {
            entries: [right, up, left, down],
        }
    }

    /// Weights equal to the prior mean in every direction.
    pub fn canonical() -> Self {
        TransitionWeights {
            entries: Direction::ALL.map(canonical_template),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Direction, &Array2<f64>)> {
        Direction::ALL.into_iter().zip(self.entries.iter())
    }

    /// Apply `f` to each direction's matrix, keeping the direction labels.
    pub fn map<F>(&self, mut f: F) -> TransitionWeights
    where
        F: FnMut(Direction, &Array2<f64>) -> Array2<f64>,
    {
        TransitionWeights {
            entries: Direction::ALL.map(|direction| f(direction, &self.entries[direction.index()])),
        }
    }

    /// All four matrices flattened row-major in direction order.
    pub fn flattened(&self) -> Array1<f64> {
        self.entries.iter().flat_map(|entry| flatten(entry)).collect()
    }
}

impl Index<Direction> for TransitionWeights {
    type Output = Array2<f64>;

    fn index(&self, direction: Direction) -> &Self::Output {
        &self.entries[direction.index()]
    }
}

impl IndexMut<Direction> for TransitionWeights {
    fn index_mut(&mut self, direction: Direction) -> &mut Self::Output {
        &mut self.entries[direction.index()]
    }
}

/// One point of the joint parameter space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub reward: RewardVector,
    pub weights: TransitionWeights,
    /// Temperature of the transition model.
    pub beta: f64,
}

/// Draw a reward vector uniformly from `[-r_max, r_max]^d_states` and snap it to the grid.
pub fn select_random_reward<R: Rng + ?Sized>(
    d_states: usize,
    step_size: f64,
    r_max: f64,
    rng: &mut R,
) -> RewardVector {
    let uniform = Uniform::new_inclusive(-r_max, r_max);
    (0..d_states)
        .map(|_| stick_to_grid(uniform.sample(rng), step_size).clamp(-r_max, r_max))
        .collect()
}

/// Perturb each canonical template with `N(0, 0.05)` noise and snap to the grid.
pub fn select_random_tpweights<R: Rng + ?Sized>(step_size: f64, rng: &mut R) -> TransitionWeights {
    let std = TPWEIGHT_PRIOR_VARIANCE.sqrt();
    TransitionWeights::canonical().map(|_, template| {
        let perturbed = template.mapv(|mean| {
            let z: f64 = StandardNormal.sample(rng);
            mean + std * z
        });
        stick_array_to_grid(&perturbed, step_size)
    })
}

/// Draw beta from its prior and snap it to `BETA_GRID_STEP`.
pub fn select_random_tpbeta<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    let z: f64 = StandardNormal.sample(rng);
    stick_to_grid(BETA_PRIOR_MEAN + BETA_PRIOR_STD * z, BETA_GRID_STEP).clamp(BETA_MIN, BETA_MAX)
}
