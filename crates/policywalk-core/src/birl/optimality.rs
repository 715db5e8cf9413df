use crate::birl::{ids::EnvId, mdp::BirlMdp};

/// Return `true` if any environment's policy picks an action whose Q-value is strictly below
/// another action's in the same state.
pub fn suboptimal<M: BirlMdp>(mdps: &[M], envs: &[EnvId]) -> bool {
    envs.iter().any(|env| {
        let mdp = &mdps[env.index()];
        let q = mdp.q_values();
        mdp.policy().iter().enumerate().any(|(state, &chosen)| {
            let chosen_q = q[(state, chosen)];
            q.row(state).iter().any(|&other| chosen_q < other)
        })
    })
}
