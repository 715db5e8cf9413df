use std::{fs, path::Path};

use policywalk_core::{Demonstration, DemonstrationSet, StateAction};
use serde::{Deserialize, Serialize};

use crate::{GridError, GridMdp, GridSpec};

/// Load a grid spec from YAML on disk.
pub fn load_yaml(path: impl AsRef<Path>) -> Result<GridSpec, GridError> {
    let yaml = fs::read_to_string(path)?;
    let spec: GridSpec = serde_yaml::from_str(&yaml)?;
    Ok(spec)
}

/// Load and compile a grid from a YAML file.
pub fn compile_yaml(path: impl AsRef<Path>) -> Result<GridMdp, GridError> {
    let spec = load_yaml(path)?;
    spec.compile()
}

/// Serialize and write a grid spec to YAML.
pub fn save_yaml(path: impl AsRef<Path>, spec: &GridSpec) -> Result<(), GridError> {
    let yaml = serde_yaml::to_string(spec)?;
    fs::write(path, yaml)?;
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// On-disk form of a demonstration set.
pub struct DemoFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,
    pub demonstrations: Vec<DemoRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// One demonstration: its environment, start state, and `[state, action]` pairs.
pub struct DemoRecord {
    pub env: usize,
    pub start: usize,
    pub trace: Vec<[usize; 2]>,
}

impl DemoFile {
    pub fn from_set(demos: &DemonstrationSet) -> Self {
        let demonstrations = demos
            .iter()
            .map(|(demo, trace)| DemoRecord {
                env: demo.env.index(),
                start: demo.start,
                trace: trace.iter().map(|step| [step.state, step.action]).collect(),
            })
            .collect();
        DemoFile {
            version: Some(1),
            demonstrations,
        }
    }

    /// Validate the records into a [`DemonstrationSet`].
    pub fn into_set(self) -> Result<DemonstrationSet, GridError> {
        let (list, traces): (Vec<_>, Vec<_>) = self
            .demonstrations
            .into_iter()
            .map(|record| {
                let trace = record
                    .trace
                    .into_iter()
                    .map(|[state, action]| StateAction::new(state, action))
                    .collect::<Vec<_>>();
                (Demonstration::new(record.start, record.env), trace)
            })
            .unzip();
        Ok(DemonstrationSet::new(list, traces)?)
    }
}

/// Load demonstrations from a YAML [`DemoFile`].
pub fn load_demonstrations(path: impl AsRef<Path>) -> Result<DemonstrationSet, GridError> {
    let yaml = fs::read_to_string(path)?;
    let file: DemoFile = serde_yaml::from_str(&yaml)?;
    file.into_set()
}

/// Write demonstrations as a YAML [`DemoFile`].
pub fn save_demonstrations(
    path: impl AsRef<Path>,
    demos: &DemonstrationSet,
) -> Result<(), GridError> {
    let yaml = serde_yaml::to_string(&DemoFile::from_set(demos))?;
    fs::write(path, yaml)?;
    Ok(())
}

/// Check that every demonstration resolves to a grid and only visits its states and actions.
pub fn validate_demonstrations(
    grids: &[GridMdp],
    demos: &DemonstrationSet,
) -> Result<(), GridError> {
    Ok(demos.validate_for(grids)?)
}
