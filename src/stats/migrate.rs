use serde::{Deserialize, Serialize};

use crate::rating::types::{RatingState, INITIAL_RD, INITIAL_VOLATILITY};

/// Stats written before the Glicko-2 engine, when only an Elo number was kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacyStats {
    pub elo: f64,
    #[serde(default)]
    pub battles: u32,
    #[serde(default)]
    pub wins: u32,
    #[serde(default)]
    pub losses: u32,
}

/// Persisted rating state in any format this crate has ever written.
///
/// A record carrying `rating` is current even if a stale `elo` field is
/// still present next to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StoredStats {
    Glicko2(RatingState),
    LegacyElo(LegacyStats),
}

impl StoredStats {
    pub fn is_legacy(&self) -> bool {
        matches!(self, StoredStats::LegacyElo(_))
    }
}

impl From<RatingState> for StoredStats {
    fn from(state: RatingState) -> Self {
        StoredStats::Glicko2(state)
    }
}

/// Convert a stored record to the current state. Counts are preserved, the
/// Elo value becomes the rating and RD/volatility start from scratch.
pub fn migrate_legacy(stored: StoredStats) -> RatingState {
    match stored {
        StoredStats::Glicko2(state) => state,
        StoredStats::LegacyElo(legacy) => RatingState {
            rating: legacy.elo,
            rd: INITIAL_RD,
            volatility: INITIAL_VOLATILITY,
            battles: legacy.battles,
            wins: legacy.wins,
            losses: legacy.losses,
        },
    }
}
