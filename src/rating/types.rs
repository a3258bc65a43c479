use serde::{Deserialize, Serialize};

pub const BASE_RATING: f64 = 1500.0;
pub const INITIAL_RD: f64 = 350.0;
pub const INITIAL_VOLATILITY: f64 = 0.06;

fn default_rd() -> f64 {
    INITIAL_RD
}

fn default_volatility() -> f64 {
    INITIAL_VOLATILITY
}

/// Mutable rating state of one item, on the display scale.
///
/// Stats persisted before RD/volatility were tracked deserialize with the
/// initial defaults for the missing fields.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatingState {
    pub rating: f64,
    #[serde(default = "default_rd")]
    pub rd: f64,
    #[serde(default = "default_volatility")]
    pub volatility: f64,
    #[serde(default)]
    pub battles: u32,
    #[serde(default)]
    pub wins: u32,
    #[serde(default)]
    pub losses: u32,
}

impl Default for RatingState {
    fn default() -> Self {
        Self::with_rating(BASE_RATING)
    }
}

impl RatingState {
    pub fn with_rating(rating: f64) -> Self {
        Self {
            rating,
            rd: INITIAL_RD,
            volatility: INITIAL_VOLATILITY,
            battles: 0,
            wins: 0,
            losses: 0,
        }
    }

    pub fn is_consistent(&self) -> bool {
        self.rating.is_finite()
            && self.rd > 0.0
            && self.volatility > 0.0
            && self.battles == self.wins + self.losses
    }

    pub(crate) fn set_glicko(&mut self, rating: f64, rd: f64, volatility: f64) {
        self.rating = rating;
        self.rd = rd;
        self.volatility = volatility;
    }
}

/// A player on the internal Glicko-2 scale (μ, φ, σ).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlickoPoint {
    pub mu: f64,
    pub phi: f64,
    pub sigma: f64,
}

/// One game of a rating period: opponent position and observed score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Opponent {
    pub mu: f64,
    pub phi: f64,
    pub score: f64,
}

/// Result of a one-vs-one period for a winner and a loser.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PairOutcome {
    pub new_winner_rating: f64,
    pub new_winner_rd: f64,
    pub new_winner_volatility: f64,
    pub new_loser_rating: f64,
    pub new_loser_rd: f64,
    pub new_loser_volatility: f64,
}

impl PairOutcome {
    pub fn apply(&self, winner: &mut RatingState, loser: &mut RatingState) {
        winner.set_glicko(
            self.new_winner_rating,
            self.new_winner_rd,
            self.new_winner_volatility,
        );
        loser.set_glicko(
            self.new_loser_rating,
            self.new_loser_rd,
            self.new_loser_volatility,
        );
    }
}
