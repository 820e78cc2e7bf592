//! Guest boot: state machine, process execution and sequencing.

mod orchestrator;
mod runner;
mod state;

pub use orchestrator::Orchestrator;
pub use runner::{ProcessOutput, ProcessRunner, SystemRunner};
pub use state::{BootSequence, BootState};
