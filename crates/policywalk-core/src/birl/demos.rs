use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::birl::{
    error::BirlError,
    ids::{EnvId, StateAction},
    mdp::BirlMdp,
};

/// Where a demonstration begins and which environment it was recorded in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Demonstration {
    pub start: usize,
    pub env: EnvId,
}

impl Demonstration {
    pub fn new(start: usize, env: impl Into<EnvId>) -> Self {
        Demonstration {
            start,
            env: env.into(),
        }
    }
}

/// Demonstration list paired index-by-index with the recorded state-action traces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemonstrationSet {
    list: Vec<Demonstration>,
    traces: Vec<Vec<StateAction>>,
}

impl DemonstrationSet {
    /// Pair a demonstration list with its traces.
    ///
    /// Fails if the set is empty, the lengths differ or any trace is empty.
    pub fn new(
        list: Vec<Demonstration>,
        traces: Vec<Vec<StateAction>>,
    ) -> Result<Self, BirlError> {
        if list.is_empty() {
            return Err(BirlError::EmptyDemonstrations);
        }
        if list.len() != traces.len() {
            return Err(BirlError::DemonstrationMismatch {
                list: list.len(),
                traces: traces.len(),
            });
        }
        if let Some(demo) = traces.iter().position(Vec::is_empty) {
            return Err(BirlError::EmptyTrace { demo });
        }
        Ok(DemonstrationSet { list, traces })
    }

    /// Check that every environment index resolves inside a collection of `num_envs` MDPs.
    pub fn validate_against(&self, num_envs: usize) -> Result<(), BirlError> {
        for (demo, entry) in self.list.iter().enumerate() {
            if entry.env.index() >= num_envs {
                return Err(BirlError::UnknownEnvironment {
                    demo,
                    env: entry.env,
                    num_envs,
                });
            }
        }
        Ok(())
    }

    /// Check environment indices, start states and every trace step against `mdps`.
    pub fn validate_for<M: BirlMdp>(&self, mdps: &[M]) -> Result<(), BirlError> {
        self.validate_against(mdps.len())?;
        for (demo, (entry, trace)) in self.iter().enumerate() {
            let mdp = &mdps[entry.env.index()];
            if entry.start >= mdp.num_states() {
                return Err(BirlError::StartOutOfRange {
                    demo,
                    start: entry.start,
                });
            }
            for (step, sa) in trace.iter().enumerate() {
                if sa.state >= mdp.num_states() || sa.action >= mdp.num_actions() {
                    return Err(BirlError::StepOutOfRange {
                        demo,
                        step,
                        state: sa.state,
                        action: sa.action,
                    });
                }
            }
        }
        Ok(())
    }

    pub fn list(&self) -> &[Demonstration] {
        &self.list
    }

    pub fn traces(&self) -> &[Vec<StateAction>] {
        &self.traces
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// Iterate `(demonstration, trace)` pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (&Demonstration, &[StateAction])> {
        self.list
            .iter()
            .zip(self.traces.iter().map(Vec::as_slice))
    }

    /// Sorted environment indices referenced by at least one demonstration.
    pub fn unique_envs(&self) -> Vec<EnvId> {
        self.list
            .iter()
            .map(|demo| demo.env)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}
