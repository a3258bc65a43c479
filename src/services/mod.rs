pub mod session;
mod simulation;

pub use session::{Session, SimulationReport};
