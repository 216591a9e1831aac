//! Application systems
//!
//! Systems that drive scenes outside of tests.

mod simulation;

pub use simulation::{SimulationResult, SimulationSummary, SimulationSystem};
