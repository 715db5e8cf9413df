mod builder;
mod compiled;
mod error;
mod io;
mod simulator;
mod spec;

pub use builder::GridBuilder;
pub use compiled::{GridMdp, MAX_EVALUATION_SWEEPS, POLICY_EPSILON};
pub use error::GridError;
pub use io::{
    DemoFile, DemoRecord, compile_yaml, load_demonstrations, load_yaml, save_demonstrations,
    save_yaml, validate_demonstrations,
};
pub use simulator::GridSimulator;
pub use spec::{Cell, GridSpec, ReturnType};
