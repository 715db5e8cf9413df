pub mod config;
pub mod demos;
pub mod error;
pub mod evaluate;
pub mod grid;
pub mod ids;
pub mod mdp;
pub mod optimality;
pub mod params;
pub mod policy_walk;
pub mod posterior;
pub mod prior;
pub mod proposal;
pub mod stats;

#[cfg(test)]
mod tests;
