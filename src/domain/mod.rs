mod catalog;
pub mod models;
mod progress;

pub use catalog::ItemCatalog;
pub use models::*;
pub use progress::SimulationProgress;
