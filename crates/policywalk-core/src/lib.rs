mod birl;

pub use birl::config::{BirlConfig, ConfigError};
pub use birl::demos::{Demonstration, DemonstrationSet};
pub use birl::error::BirlError;
pub use birl::evaluate::{BirlReport, birl, get_expected_sor};
pub use birl::grid::stick_to_grid;
pub use birl::ids::{Direction, EnvId, StateAction};
pub use birl::mdp::{BirlMdp, CommitScope, Trajectory};
pub use birl::optimality::suboptimal;
pub use birl::params::{
    BETA_GRID_STEP, MOVE_KINDS, RewardVector, Sample, TERRAIN_KINDS, TransitionWeights,
    canonical_template, move_column, select_random_reward, select_random_tpbeta,
    select_random_tpweights,
};
pub use birl::policy_walk::{
    IterationMetrics, PolicyWalkRun, policy_walk, policy_walk_with_hook,
};
pub use birl::posterior::{
    PosteriorModel, TRANSITION_PROB_FLOOR, acceptance_probability, log_sum_exp,
};
pub use birl::prior::{
    BETA_MAX, BETA_MIN, BETA_PRIOR_MEAN, BETA_PRIOR_STD, PriorKind, TPWEIGHT_PRIOR_VARIANCE,
    beta_log_prior, reward_log_prior, tpweights_log_prior,
};
pub use birl::proposal::{BETA_STEP, mcmc_step};
pub use birl::stats::{Moments, RunningMoments};
