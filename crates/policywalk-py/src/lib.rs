#![allow(unsafe_op_in_unsafe_fn)]

use ::policywalk_core::{
    BirlConfig, BirlError, BirlMdp, BirlReport, Demonstration, DemonstrationSet, PriorKind,
    StateAction, birl,
};
use ::policywalk_mdp::{
    GridError, GridMdp, GridSpec, compile_yaml, load_demonstrations, save_demonstrations,
    validate_demonstrations,
};
use ndarray::Array1;
use pyo3::exceptions::{PyIndexError, PyValueError};
use pyo3::prelude::*;

fn grid_err_to_py(err: GridError) -> PyErr {
    PyValueError::new_err(err.to_string())
}

fn birl_err_to_py(err: BirlError) -> PyErr {
    PyValueError::new_err(err.to_string())
}

fn parse_prior(value: &str) -> PyResult<PriorKind> {
    match value {
        "uniform" => Ok(PriorKind::Uniform),
        "gaussian" => Ok(PriorKind::Gaussian),
        "laplace" => Ok(PriorKind::Laplace),
        _ => Err(PyValueError::new_err(
            "invalid prior; expected one of: uniform, gaussian, laplace",
        )),
    }
}

fn pairs(steps: &[StateAction]) -> Vec<(usize, usize)> {
    steps.iter().map(|step| (step.state, step.action)).collect()
}

#[pyclass(name = "GridMdp", module = "policywalk.mdp")]
#[derive(Clone)]
/// GridMdp()
/// --
///
/// Compiled grid world loaded from YAML.
///
/// States are cells in row-major order; actions are right, up, left, down.
pub struct PyGridMdp {
    inner: GridMdp,
}

impl PyGridMdp {
    fn check_state(&self, state: usize) -> PyResult<()> {
        if state >= self.inner.num_states() {
            return Err(PyIndexError::new_err(format!("unknown state: {state}")));
        }
        Ok(())
    }
}

#[pymethods]
impl PyGridMdp {
    /// num_states($self, /)
    /// --
    ///
    /// Return the number of cells.
    #[pyo3(text_signature = "($self, /)")]
    fn num_states(&self) -> usize {
        self.inner.num_states()
    }

    /// num_actions($self, /)
    /// --
    ///
    /// Return the number of actions available in every cell.
    #[pyo3(text_signature = "($self, /)")]
    fn num_actions(&self) -> usize {
        self.inner.num_actions()
    }

    /// num_features($self, /)
    /// --
    ///
    /// Return the reward vector length this grid consumes.
    #[pyo3(text_signature = "($self, /)")]
    fn num_features(&self) -> usize {
        self.inner.num_features()
    }

    #[pyo3(text_signature = "($self, /)")]
    fn goal(&self) -> usize {
        self.inner.goal()
    }

    #[pyo3(text_signature = "($self, /)")]
    fn start(&self) -> usize {
        self.inner.start()
    }

    /// state_of($self, row, col, /)
    /// --
    ///
    /// Return the state index of a cell.
    #[pyo3(text_signature = "($self, row, col, /)")]
    fn state_of(&self, row: usize, col: usize) -> PyResult<usize> {
        if row >= self.inner.rows() || col >= self.inner.cols() {
            return Err(PyIndexError::new_err(format!(
                "cell ({row}, {col}) is off the grid"
            )));
        }
        Ok(self.inner.state_of(row, col))
    }

    /// cell_of($self, state, /)
    /// --
    ///
    /// Return the `(row, col)` of a state index.
    ///
    /// Raises:
    ///     IndexError: If `state` does not exist.
    #[pyo3(text_signature = "($self, state, /)")]
    fn cell_of(&self, state: usize) -> PyResult<(usize, usize)> {
        self.check_state(state)?;
        let [row, col] = self.inner.cell_of(state);
        Ok((row, col))
    }

    /// set_reward($self, reward, /)
    /// --
    ///
    /// Install a reward vector and re-solve the policy from scratch.
    ///
    /// Raises:
    ///     ValueError: If `reward` does not have `num_features()` entries.
    #[pyo3(text_signature = "($self, reward, /)")]
    fn set_reward(&mut self, reward: Vec<f64>) -> PyResult<()> {
        if reward.len() != self.inner.num_features() {
            return Err(PyValueError::new_err(format!(
                "reward must have {} entries, got {}",
                self.inner.num_features(),
                reward.len()
            )));
        }
        self.inner.update_rewards(&Array1::from(reward));
        self.inner.update_policy(false);
        Ok(())
    }

    /// policy($self, /)
    /// --
    ///
    /// Return the action chosen in every state.
    #[pyo3(text_signature = "($self, /)")]
    fn policy(&self) -> Vec<usize> {
        self.inner.policy().to_vec()
    }

    #[pyo3(text_signature = "($self, /)")]
    fn values(&self) -> Vec<f64> {
        self.inner.values().to_vec()
    }

    /// q_values($self, /)
    /// --
    ///
    /// Return the Q table as one list of action values per state.
    #[pyo3(text_signature = "($self, /)")]
    fn q_values(&self) -> Vec<Vec<f64>> {
        self.inner
            .q_values()
            .rows()
            .into_iter()
            .map(|row| row.to_vec())
            .collect()
    }

    /// transition_probability($self, state, action, next_state, /)
    /// --
    ///
    /// Return `P(next_state | state, action)` under the current transition model.
    #[pyo3(text_signature = "($self, state, action, next_state, /)")]
    fn transition_probability(&self, state: usize, action: usize, next_state: usize) -> f64 {
        self.inner.transition_probability(state, action, next_state)
    }

    /// demonstrate($self, start, /)
    /// --
    ///
    /// Record `[(state, action), ...]` from `start` under the current policy.
    ///
    /// Raises:
    ///     IndexError: If `start` does not exist.
    #[pyo3(text_signature = "($self, start, /)")]
    fn demonstrate(&mut self, start: usize) -> PyResult<Vec<(usize, usize)>> {
        self.check_state(start)?;
        Ok(pairs(&self.inner.demonstrate(start)))
    }

    /// rollout($self, start, /)
    /// --
    ///
    /// Reseed the rollout RNG and follow the current policy from `start`.
    ///
    /// Returns:
    ///     tuple[list[tuple[int, int]], float]: `(steps, total_return)`.
    #[pyo3(text_signature = "($self, start, /)")]
    fn rollout(&mut self, start: usize) -> PyResult<(Vec<(usize, usize)>, f64)> {
        self.check_state(start)?;
        self.inner.restore();
        self.inner.set_start(start);
        let trajectory = self.inner.get_trajectories();
        Ok((pairs(&trajectory.steps), trajectory.total_return))
    }
}

#[pyfunction]
#[pyo3(text_signature = "(path, /)")]
/// compile_yaml_file(path, /)
/// --
///
/// Load and compile a grid YAML file into `GridMdp`.
///
/// Raises:
///     ValueError: If IO, YAML parsing, or grid validation fails.
fn compile_yaml_file(path: &str) -> PyResult<PyGridMdp> {
    let mdp = compile_yaml(path).map_err(grid_err_to_py)?;
    Ok(PyGridMdp { inner: mdp })
}

#[pyfunction]
#[pyo3(text_signature = "(yaml, /)")]
/// compile_yaml_str(yaml, /)
/// --
///
/// Compile grid YAML text into `GridMdp`.
///
/// Raises:
///     ValueError: If YAML parsing or grid validation fails.
fn compile_yaml_str(yaml: &str) -> PyResult<PyGridMdp> {
    let spec: GridSpec =
        serde_yaml::from_str(yaml).map_err(|err| grid_err_to_py(GridError::Yaml(err)))?;
    let mdp = spec.compile().map_err(grid_err_to_py)?;
    Ok(PyGridMdp { inner: mdp })
}

#[pyclass(name = "BirlConfig", module = "policywalk.birl")]
#[derive(Clone)]
/// BirlConfig(step_size=0.5, iterations=1000, burn_in=100, sample_freq=10, r_max=1.0, d_states=1, rationality=1.0, prior='uniform', seed=0, /)
/// --
///
/// PolicyWalk hyperparameters.
pub struct PyBirlConfig {
    inner: BirlConfig,
}

#[pymethods]
impl PyBirlConfig {
    #[new]
    #[pyo3(signature = (step_size=0.5, iterations=1000, burn_in=100, sample_freq=10, r_max=1.0, d_states=1, rationality=1.0, prior="uniform", seed=0))]
    #[pyo3(
        text_signature = "(step_size=0.5, iterations=1000, burn_in=100, sample_freq=10, r_max=1.0, d_states=1, rationality=1.0, prior='uniform', seed=0, /)"
    )]
    #[allow(clippy::too_many_arguments)]
    fn new(
        step_size: f64,
        iterations: usize,
        burn_in: usize,
        sample_freq: usize,
        r_max: f64,
        d_states: usize,
        rationality: f64,
        prior: &str,
        seed: u64,
    ) -> PyResult<Self> {
        let inner = BirlConfig {
            step_size,
            iterations,
            burn_in,
            sample_freq,
            r_max,
            d_states,
            rationality,
            prior: parse_prior(prior)?,
            seed,
        };
        inner.validate().map_err(birl_err_to_py)?;
        Ok(Self { inner })
    }

    /// from_yaml_str(yaml, /)
    /// --
    ///
    /// Parse a config from YAML text; missing keys keep their defaults.
    #[staticmethod]
    #[pyo3(text_signature = "(yaml, /)")]
    fn from_yaml_str(yaml: &str) -> PyResult<Self> {
        let inner = BirlConfig::from_yaml_str(yaml).map_err(birl_err_to_py)?;
        Ok(Self { inner })
    }

    /// default_yaml()
    /// --
    ///
    /// Return the default YAML config shipped with the library.
    #[staticmethod]
    #[pyo3(text_signature = "()")]
    fn default_yaml() -> &'static str {
        BirlConfig::default_yaml()
    }

    #[getter]
    fn iterations(&self) -> usize {
        self.inner.iterations
    }

    #[getter]
    fn burn_in(&self) -> usize {
        self.inner.burn_in
    }

    #[getter]
    fn sample_freq(&self) -> usize {
        self.inner.sample_freq
    }

    #[getter]
    fn step_size(&self) -> f64 {
        self.inner.step_size
    }

    #[getter]
    fn d_states(&self) -> usize {
        self.inner.d_states
    }

    #[getter]
    fn seed(&self) -> u64 {
        self.inner.seed
    }
}

#[pyclass(name = "Demonstrations", module = "policywalk.birl")]
#[derive(Clone)]
/// Demonstrations(records, /)
/// --
///
/// Demonstration list built from `(env, start, [(state, action), ...])` records.
///
/// Raises:
///     ValueError: If the list is empty or any trace is empty.
pub struct PyDemonstrations {
    inner: DemonstrationSet,
}

#[pymethods]
impl PyDemonstrations {
    #[new]
    #[pyo3(text_signature = "(records, /)")]
    fn new(records: Vec<(usize, usize, Vec<(usize, usize)>)>) -> PyResult<Self> {
        let (list, traces): (Vec<_>, Vec<_>) = records
            .into_iter()
            .map(|(env, start, trace)| {
                let trace = trace.into_iter().map(StateAction::from).collect::<Vec<_>>();
                (Demonstration::new(start, env), trace)
            })
            .unzip();
        let inner = DemonstrationSet::new(list, traces).map_err(birl_err_to_py)?;
        Ok(Self { inner })
    }

    /// load(path, /)
    /// --
    ///
    /// Load demonstrations from a YAML demonstration file.
    #[staticmethod]
    #[pyo3(text_signature = "(path, /)")]
    fn load(path: &str) -> PyResult<Self> {
        let inner = load_demonstrations(path).map_err(grid_err_to_py)?;
        Ok(Self { inner })
    }

    /// save($self, path, /)
    /// --
    ///
    /// Write demonstrations to a YAML demonstration file.
    #[pyo3(text_signature = "($self, path, /)")]
    fn save(&self, path: &str) -> PyResult<()> {
        save_demonstrations(path, &self.inner).map_err(grid_err_to_py)
    }

    fn __len__(&self) -> usize {
        self.inner.len()
    }
}

#[pyclass(name = "BirlReport", module = "policywalk.birl")]
/// BirlReport()
/// --
///
/// Posterior summary of a PolicyWalk run scored on held-out demonstrations.
pub struct PyBirlReport {
    #[pyo3(get)]
    sor_mean: f64,
    #[pyo3(get)]
    sor_std: f64,
    #[pyo3(get)]
    beta_mean: f64,
    #[pyo3(get)]
    beta_std: f64,
    #[pyo3(get)]
    weights_mean: Vec<f64>,
    #[pyo3(get)]
    sample_rewards: Vec<Vec<f64>>,
    #[pyo3(get)]
    sample_betas: Vec<f64>,
    #[pyo3(get)]
    suboptimal_count: usize,
    #[pyo3(get)]
    accepted_count: usize,
    #[pyo3(get)]
    ground_truth_sor: Option<f64>,
}

impl From<BirlReport> for PyBirlReport {
    fn from(value: BirlReport) -> Self {
        Self {
            sor_mean: value.sor.mean,
            sor_std: value.sor.std,
            beta_mean: value.beta.mean,
            beta_std: value.beta.std,
            weights_mean: value.weights_mean.to_vec(),
            sample_rewards: value
                .samples
                .iter()
                .map(|sample| sample.reward.to_vec())
                .collect(),
            sample_betas: value.samples.iter().map(|sample| sample.beta).collect(),
            suboptimal_count: value.suboptimal_count,
            accepted_count: value.accepted_count,
            ground_truth_sor: value.ground_truth_sor,
        }
    }
}

#[pyfunction]
#[pyo3(signature = (mdps, config, demos, test_demos, ground_truth=None))]
#[pyo3(text_signature = "(mdps, config, demos, test_demos, ground_truth=None, /)")]
/// run_birl(mdps, config, demos, test_demos, ground_truth=None, /)
/// --
///
/// Run PolicyWalk on `demos` and score the chain on `test_demos`.
///
/// The grids are copied; the Python objects are left untouched.
///
/// Raises:
///     ValueError: If the config is invalid or a demonstration leaves its grid.
fn run_birl(
    mdps: Vec<PyRef<'_, PyGridMdp>>,
    config: PyRef<'_, PyBirlConfig>,
    demos: PyRef<'_, PyDemonstrations>,
    test_demos: PyRef<'_, PyDemonstrations>,
    ground_truth: Option<Vec<f64>>,
) -> PyResult<PyBirlReport> {
    let mut grids: Vec<GridMdp> = mdps.iter().map(|mdp| mdp.inner.clone()).collect();
    validate_demonstrations(&grids, &demos.inner).map_err(grid_err_to_py)?;
    validate_demonstrations(&grids, &test_demos.inner).map_err(grid_err_to_py)?;
    let ground_truth = ground_truth.map(Array1::from);
    let report = birl(
        &mut grids,
        &config.inner,
        &demos.inner,
        &test_demos.inner,
        ground_truth.as_ref(),
    )
    .map_err(birl_err_to_py)?;
    Ok(report.into())
}

#[pymodule]
fn policywalk(py: Python<'_>, module: &Bound<'_, PyModule>) -> PyResult<()> {
    let mdp_mod = PyModule::new_bound(py, "mdp")?;
    mdp_mod.add_class::<PyGridMdp>()?;
    mdp_mod.add_function(wrap_pyfunction!(compile_yaml_file, &mdp_mod)?)?;
    mdp_mod.add_function(wrap_pyfunction!(compile_yaml_str, &mdp_mod)?)?;

    let birl_mod = PyModule::new_bound(py, "birl")?;
    birl_mod.add_class::<PyBirlConfig>()?;
    birl_mod.add_class::<PyDemonstrations>()?;
    birl_mod.add_class::<PyBirlReport>()?;
    birl_mod.add_function(wrap_pyfunction!(run_birl, &birl_mod)?)?;

    module.add_submodule(&mdp_mod)?;
    module.add_submodule(&birl_mod)?;

    let sys_modules = py.import_bound("sys")?.getattr("modules")?;
    sys_modules.set_item("policywalk.mdp", &mdp_mod)?;
    sys_modules.set_item("policywalk.birl", &birl_mod)?;

    Ok(())
}
