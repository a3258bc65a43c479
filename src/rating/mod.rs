pub mod display;
pub mod glicko2;
pub mod types;
mod volatility;

pub use display::displayed_rating;
pub use glicko2::{expected_score, g, Glicko2};
pub use types::{GlickoPoint, Opponent, PairOutcome, RatingState};
pub use volatility::{solve_volatility, VolatilityProblem};
