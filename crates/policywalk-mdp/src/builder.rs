use crate::{Cell, GridError, GridMdp, GridSpec, ReturnType};

#[derive(Debug, Clone)]
/// Struct to build grid worlds
pub struct GridBuilder {
    rows: usize,
    cols: usize,
    start: Option<Cell>,
    goal: Option<Cell>,
    walls: Vec<Cell>,
    slippery: Vec<Cell>,
    features: Option<(Vec<Vec<usize>>, usize)>,
    gamma: f64,
    horizon: usize,
    return_type: ReturnType,
    seed: u64,
}

impl GridBuilder {
    /// Create a builder for a `rows x cols` grid with no walls
    pub fn new(rows: usize, cols: usize) -> Self {
        GridBuilder {
            rows,
            cols,
            start: None,
            goal: None,
            walls: Vec::new(),
            slippery: Vec::new(),
            features: None,
            gamma: 0.95,
            horizon: 100,
            return_type: ReturnType::default(),
            seed: 0,
        }
    }

    /// Define the start cell of the grid
    pub fn set_start(&mut self, row: usize, col: usize) -> &mut Self {
        self.start = Some([row, col]);
        self
    }

    /// Define the absorbing goal cell
    pub fn set_goal(&mut self, row: usize, col: usize) -> &mut Self {
        self.goal = Some([row, col]);
        self
    }

    pub fn add_wall(&mut self, row: usize, col: usize) -> &mut Self {
        self.walls.push([row, col]);
        self
    }

    pub fn add_slippery(&mut self, row: usize, col: usize) -> &mut Self {
        self.slippery.push([row, col]);
        self
    }

    /// Share reward features between cells
    /// `features[row][col]` indexes into a reward vector of length `num_features`
    pub fn set_features(&mut self, features: Vec<Vec<usize>>, num_features: usize) -> &mut Self {
        self.features = Some((features, num_features));
        self
    }

    pub fn set_gamma(&mut self, gamma: f64) -> &mut Self {
        self.gamma = gamma;
        self
    }

    pub fn set_horizon(&mut self, horizon: usize) -> &mut Self {
        self.horizon = horizon;
        self
    }

    pub fn set_return_type(&mut self, return_type: ReturnType) -> &mut Self {
        self.return_type = return_type;
        self
    }

    pub fn set_seed(&mut self, seed: u64) -> &mut Self {
        self.seed = seed;
        self
    }

    pub fn build_spec(self) -> Result<GridSpec, GridError> {
        let start = self
            .start
            .ok_or(GridError::BuilderMissingCell { what: "start" })?;
        let goal = self
            .goal
            .ok_or(GridError::BuilderMissingCell { what: "goal" })?;
        let (features, num_features) = match self.features {
            Some((features, num_features)) => (Some(features), Some(num_features)),
            None => (None, None),
        };
        let spec = GridSpec {
            version: Some(1),
            rows: self.rows,
            cols: self.cols,
            start,
            goal,
            walls: self.walls,
            slippery: self.slippery,
            features,
            num_features,
            gamma: self.gamma,
            horizon: self.horizon,
            return_type: self.return_type,
            seed: self.seed,
        };
        spec.validate()?;
        Ok(spec)
    }

    pub fn compile(self) -> Result<GridMdp, GridError> {
        let spec = self.build_spec()?;
        spec.compile()
    }
}
