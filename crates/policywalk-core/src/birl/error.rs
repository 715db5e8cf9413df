use thiserror::Error;

use crate::birl::{config::ConfigError, ids::EnvId, prior::PriorKind};

/// Error type for configuration and input validation around a BIRL run.
///
/// Numeric degeneracies inside the sampler are guarded locally and never surface here.
#[derive(Debug, Error)]
pub enum BirlError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("prior distribution '{prior:?}' is not supported for rewards")]
    UnsupportedPrior { prior: PriorKind },

    #[error("demonstration list must contain at least one demonstration")]
    EmptyDemonstrations,

    #[error("demonstration list has {list} entries but {traces} traces were supplied")]
    DemonstrationMismatch { list: usize, traces: usize },

    #[error("demonstration {demo} has an empty trace")]
    EmptyTrace { demo: usize },

    #[error("demonstration {demo} references environment {} but only {num_envs} exist", env.index())]
    UnknownEnvironment {
        demo: usize,
        env: EnvId,
        num_envs: usize,
    },

    #[error("demonstration {demo} starts in state {start}, which its environment does not have")]
    StartOutOfRange { demo: usize, start: usize },

    #[error("demonstration {demo}, step {step}: ({state}, {action}) is not a state-action pair of its environment")]
    StepOutOfRange {
        demo: usize,
        step: usize,
        state: usize,
        action: usize,
    },

    #[error("environment {} expects {expected} reward weights but {actual} were supplied", env.index())]
    RewardLengthMismatch {
        env: EnvId,
        expected: usize,
        actual: usize,
    },

    #[error("no samples were recorded: burn-in and sampling stride skipped every iteration")]
    NoSamples,
}
