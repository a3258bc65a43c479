use std::collections::HashMap;

use super::types::{BattleSnapshot, SideSnapshot};
use crate::errors::RankingError;
use crate::rating::glicko2::Glicko2;
use crate::rating::types::{PairOutcome, RatingState};

/// Ranks closer than this make a close fight.
const CLOSE_FIGHT_RANK_GAP: usize = 3;

/// Everything a battle can do to its two participants, computed up front so
/// nothing is mutated when the engine fails.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BattleOutcome {
    pub winner_before: RatingState,
    pub loser_before: RatingState,
    pub forward: PairOutcome,
    pub reversed: PairOutcome,
    pub expected_winner: f64,
}

impl BattleOutcome {
    pub fn compute(
        engine: &Glicko2,
        winner_before: &RatingState,
        loser_before: &RatingState,
    ) -> Result<Self, RankingError> {
        let forward = engine.update_pair(winner_before, loser_before)?;
        let reversed = engine.update_pair(loser_before, winner_before)?;

        Ok(Self {
            winner_before: *winner_before,
            loser_before: *loser_before,
            forward,
            reversed,
            expected_winner: engine.win_probability(winner_before, loser_before),
        })
    }

    /// Copies of the pre-battle states with the forward outcome applied.
    /// Battle counts are left alone.
    pub fn after_states(
        &self,
        winner: &RatingState,
        loser: &RatingState,
    ) -> (RatingState, RatingState) {
        let mut winner = *winner;
        let mut loser = *loser;
        self.forward.apply(&mut winner, &mut loser);
        (winner, loser)
    }

    pub fn winner_gain(&self) -> f64 {
        self.forward.new_winner_rating - self.winner_before.rating
    }

    pub fn winner_loss(&self) -> f64 {
        self.reversed.new_loser_rating - self.winner_before.rating
    }

    pub fn loser_gain(&self) -> f64 {
        self.reversed.new_winner_rating - self.loser_before.rating
    }

    pub fn loser_loss(&self) -> f64 {
        self.forward.new_loser_rating - self.loser_before.rating
    }

    pub fn winner_snapshot(&self, ranks: RankPair, total_battles_before: u32) -> SideSnapshot {
        SideSnapshot {
            rating_before: self.winner_before.rating,
            rating_after: self.forward.new_winner_rating,
            rd_before: self.winner_before.rd,
            rd_after: self.forward.new_winner_rd,
            volatility_before: self.winner_before.volatility,
            volatility_after: self.forward.new_winner_volatility,
            rank_before: ranks.before,
            rank_after: ranks.after,
            potential_gain: self.winner_gain(),
            potential_loss: self.winner_loss(),
            expected_win_probability: self.expected_winner,
            total_battles_before,
        }
    }

    pub fn loser_snapshot(&self, ranks: RankPair, total_battles_before: u32) -> SideSnapshot {
        SideSnapshot {
            rating_before: self.loser_before.rating,
            rating_after: self.forward.new_loser_rating,
            rd_before: self.loser_before.rd,
            rd_after: self.forward.new_loser_rd,
            volatility_before: self.loser_before.volatility,
            volatility_after: self.forward.new_loser_volatility,
            rank_before: ranks.before,
            rank_after: ranks.after,
            potential_gain: self.loser_gain(),
            potential_loss: self.loser_loss(),
            expected_win_probability: 1.0 - self.expected_winner,
            total_battles_before,
        }
    }

    /// Write the recomputed after-values, ranks, potentials and expected
    /// probability into existing snapshots, keeping their before-values.
    pub fn refresh(
        &self,
        winner: &mut SideSnapshot,
        loser: &mut SideSnapshot,
        winner_rank: usize,
        loser_rank: usize,
    ) {
        let winner_ranks = RankPair { before: winner.rank_before, after: winner_rank };
        let loser_ranks = RankPair { before: loser.rank_before, after: loser_rank };
        let fresh_winner = self.winner_snapshot(winner_ranks, winner.total_battles_before);
        let fresh_loser = self.loser_snapshot(loser_ranks, loser.total_battles_before);
        *winner = fresh_winner;
        *loser = fresh_loser;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankPair {
    pub before: usize,
    pub after: usize,
}

pub fn rank_pair(
    name: &str,
    before: &HashMap<String, usize>,
    after: &HashMap<String, usize>,
) -> RankPair {
    RankPair {
        before: before.get(name).copied().unwrap_or(0),
        after: after.get(name).copied().unwrap_or(0),
    }
}

pub fn is_close_fight(rank_a: usize, rank_b: usize) -> bool {
    rank_a.abs_diff(rank_b) < CLOSE_FIGHT_RANK_GAP
}

/// Arrange winner/loser snapshots into left/right order.
pub fn into_battle_snapshot(
    winner_is_left: bool,
    winner: SideSnapshot,
    loser: SideSnapshot,
) -> BattleSnapshot {
    let (stats_a, stats_b) = if winner_is_left { (winner, loser) } else { (loser, winner) };
    BattleSnapshot {
        stats_a,
        stats_b,
        close_fight: is_close_fight(stats_a.rank_before, stats_b.rank_before),
    }
}
