use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::pairing::pair_key::pair_key;
use crate::rating::types::RatingState;

/// Position of an item in a battle as it was shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn other(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Left => write!(f, "left"),
            Side::Right => write!(f, "right"),
        }
    }
}

/// Rating movement of one participant across one battle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SideSnapshot {
    pub rating_before: f64,
    pub rating_after: f64,
    pub rd_before: f64,
    pub rd_after: f64,
    pub volatility_before: f64,
    pub volatility_after: f64,
    pub rank_before: usize,
    pub rank_after: usize,
    /// Rating change had this side won.
    pub potential_gain: f64,
    /// Rating change had this side lost.
    pub potential_loss: f64,
    pub expected_win_probability: f64,
    pub total_battles_before: u32,
}

impl SideSnapshot {
    /// Pre-battle rating state. Counts are not part of the snapshot.
    pub fn state_before(&self) -> RatingState {
        RatingState {
            rating: self.rating_before,
            rd: self.rd_before,
            volatility: self.volatility_before,
            ..RatingState::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BattleSnapshot {
    pub stats_a: SideSnapshot,
    pub stats_b: SideSnapshot,
    pub close_fight: bool,
}

/// One resolved battle. `stats_a` belongs to `left`, `stats_b` to `right`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BattleRecord {
    pub pair_key: String,
    pub left: String,
    pub right: String,
    pub winner: String,
    pub loser: String,
    pub timestamp: DateTime<Utc>,
    pub stats_a: SideSnapshot,
    pub stats_b: SideSnapshot,
    pub close_fight: bool,
}

impl BattleRecord {
    pub fn name(&self, side: Side) -> &str {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }

    pub fn winner_side(&self) -> Side {
        if self.winner == self.left {
            Side::Left
        } else {
            Side::Right
        }
    }

    pub fn snapshot(&self, side: Side) -> &SideSnapshot {
        match side {
            Side::Left => &self.stats_a,
            Side::Right => &self.stats_b,
        }
    }

    pub fn snapshot_mut(&mut self, side: Side) -> &mut SideSnapshot {
        match side {
            Side::Left => &mut self.stats_a,
            Side::Right => &mut self.stats_b,
        }
    }

    /// Two distinct sides, the winner and loser are exactly those sides and
    /// the pair key matches them.
    pub fn is_well_formed(&self) -> bool {
        let sides_match = (self.winner == self.left && self.loser == self.right)
            || (self.winner == self.right && self.loser == self.left);
        self.left != self.right && sides_match && self.pair_key == pair_key(&self.left, &self.right)
    }
}

/// A deleted entry and the position it was removed from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeletedEntry {
    pub entry: BattleRecord,
    pub index: usize,
}
