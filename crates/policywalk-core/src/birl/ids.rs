use serde::{Deserialize, Serialize};

/// Identifies one environment by its position in the slice of MDPs handed to the sampler.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EnvId(usize);

impl EnvId {
    /// Get the position of the environment inside the MDP collection.
    pub fn index(&self) -> usize {
        self.0
    }
}

impl From<usize> for EnvId {
    /// Demonstration files store environments as plain indices.
    fn from(value: usize) -> Self {
        EnvId(value)
    }
}

/// One demonstrated step: the state the expert was in and the action it took.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StateAction {
    pub state: usize,
    pub action: usize,
}

impl StateAction {
    pub fn new(state: usize, action: usize) -> Self {
        StateAction { state, action }
    }
}

impl From<(usize, usize)> for StateAction {
    fn from((state, action): (usize, usize)) -> Self {
        StateAction { state, action }
    }
}

/// Movement directions labelling the four transition-weight entries.
///
/// The discriminant doubles as the action index in grid environments.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Right = 0,
    Up = 1,
    Left = 2,
    Down = 3,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Right,
        Direction::Up,
        Direction::Left,
        Direction::Down,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// The direction that undoes this one.
    pub fn reverse(self) -> Direction {
        match self {
            Direction::Right => Direction::Left,
            Direction::Up => Direction::Down,
            Direction::Left => Direction::Right,
            Direction::Down => Direction::Up,
        }
    }

    /// `(row, col)` offset of one step, with row 0 at the top.
    pub fn delta(self) -> (isize, isize) {
        match self {
            Direction::Right => (0, 1),
            Direction::Up => (-1, 0),
            Direction::Left => (0, -1),
            Direction::Down => (1, 0),
        }
    }

    pub fn from_index(index: usize) -> Option<Direction> {
        Direction::ALL.get(index).copied()
    }
}
