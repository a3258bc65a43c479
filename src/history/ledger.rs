use std::collections::VecDeque;

use chrono::Utc;
use log::{debug, info, warn};

use super::outcome::{into_battle_snapshot, rank_pair, BattleOutcome};
use super::types::{BattleRecord, BattleSnapshot, DeletedEntry, Side};
use crate::config::settings::HistorySettings;
use crate::errors::RankingError;
use crate::pairing::pair_key::{pair_key, CompletedPairs};
use crate::rating::glicko2::Glicko2;
use crate::stats::StatsStore;

/// Chronological battle history with the completed-pair set and the undo
/// stack of deleted entries.
#[derive(Debug, Clone)]
pub struct HistoryLedger {
    pub(super) entries: Vec<BattleRecord>,
    undo_stack: VecDeque<DeletedEntry>,
    completed: CompletedPairs,
    max_history: usize,
    max_undo: usize,
}

impl HistoryLedger {
    pub fn new(settings: &HistorySettings) -> Self {
        Self {
            entries: Vec::new(),
            undo_stack: VecDeque::new(),
            completed: CompletedPairs::new(),
            max_history: settings.max_history,
            max_undo: settings.max_undo,
        }
    }

    /// Rebuild a ledger from persisted parts. Pair keys of surviving entries
    /// that are missing from `completed` are added back.
    pub fn from_parts(
        settings: &HistorySettings,
        entries: Vec<BattleRecord>,
        undo_stack: Vec<DeletedEntry>,
        completed: CompletedPairs,
    ) -> Self {
        let loaded = entries.len() + undo_stack.len();
        let entries: Vec<BattleRecord> =
            entries.into_iter().filter(BattleRecord::is_well_formed).collect();
        let undo_stack: VecDeque<DeletedEntry> =
            undo_stack.into_iter().filter(|deleted| deleted.entry.is_well_formed()).collect();
        let dropped = loaded - entries.len() - undo_stack.len();
        if dropped > 0 {
            warn!("Dropped {} malformed history entries", dropped);
        }

        let mut ledger = Self {
            entries,
            undo_stack,
            completed,
            max_history: settings.max_history,
            max_undo: settings.max_undo,
        };
        ledger.truncate_history();
        ledger.truncate_undo();

        let repaired = ledger.reconcile_pairs();
        if repaired > 0 {
            warn!("Restored {} missing pair keys from history", repaired);
        }
        ledger
    }

    pub fn entries(&self) -> &[BattleRecord] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&BattleRecord> {
        self.entries.get(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn completed(&self) -> &CompletedPairs {
        &self.completed
    }

    pub fn undo_stack(&self) -> impl Iterator<Item = &DeletedEntry> {
        self.undo_stack.iter()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.undo_stack.clear();
        self.completed.clear();
    }

    /// Append a battle, mark its pair as completed and drop the oldest
    /// entries beyond the retention cap. Dropped entries keep their pair key.
    pub fn record(
        &mut self,
        left: &str,
        right: &str,
        winner: Side,
        snapshot: BattleSnapshot,
    ) -> &BattleRecord {
        let (winner_name, loser_name) = match winner {
            Side::Left => (left, right),
            Side::Right => (right, left),
        };
        let key = pair_key(left, right);
        self.completed.insert_key(&key);

        self.entries.push(BattleRecord {
            pair_key: key,
            left: left.to_string(),
            right: right.to_string(),
            winner: winner_name.to_string(),
            loser: loser_name.to_string(),
            timestamp: Utc::now(),
            stats_a: snapshot.stats_a,
            stats_b: snapshot.stats_b,
            close_fight: snapshot.close_fight,
        });
        self.truncate_history();

        &self.entries[self.entries.len() - 1]
    }

    /// Rate a battle and record it. The engine runs before any state is
    /// touched; on error neither the stats nor the ledger change.
    pub fn record_battle(
        &mut self,
        stats: &mut StatsStore,
        engine: &Glicko2,
        left: &str,
        right: &str,
        winner: Side,
    ) -> Result<&BattleRecord, RankingError> {
        let (winner_name, loser_name) = match winner {
            Side::Left => (left, right),
            Side::Right => (right, left),
        };

        let winner_before = stats.get_or_default(winner_name);
        let loser_before = stats.get_or_default(loser_name);
        let outcome = BattleOutcome::compute(engine, &winner_before, &loser_before)?;

        stats.ensure(winner_name);
        stats.ensure(loser_name);
        let ranks_before = stats.ranks();

        let (mut winner_after, mut loser_after) =
            outcome.after_states(&winner_before, &loser_before);
        winner_after.battles += 1;
        winner_after.wins += 1;
        loser_after.battles += 1;
        loser_after.losses += 1;
        stats.set(winner_name, winner_after);
        stats.set(loser_name, loser_after);
        let ranks_after = stats.ranks();

        let snapshot = into_battle_snapshot(
            winner == Side::Left,
            outcome.winner_snapshot(
                rank_pair(winner_name, &ranks_before, &ranks_after),
                winner_before.battles,
            ),
            outcome.loser_snapshot(
                rank_pair(loser_name, &ranks_before, &ranks_after),
                loser_before.battles,
            ),
        );

        debug!(
            "{} beat {} ({:.1} -> {:.1})",
            winner_name, loser_name, winner_before.rating, winner_after.rating
        );
        Ok(self.record(left, right, winner, snapshot))
    }

    /// Remove an entry and push it on the undo stack. Ratings are not
    /// reverted; the pair is reopened unless another entry still holds it.
    pub fn delete(&mut self, index: usize) -> Result<BattleRecord, RankingError> {
        self.check_index(index)?;

        let removed = self.entries.remove(index);
        let still_battled = self.entries.iter().any(|e| e.pair_key == removed.pair_key);
        if !still_battled {
            self.completed.remove_key(&removed.pair_key);
        }

        self.undo_stack.push_back(DeletedEntry {
            entry: removed.clone(),
            index,
        });
        self.truncate_undo();

        info!("Deleted history entry {}: {} vs {}", index, removed.left, removed.right);
        Ok(removed)
    }

    /// Reinsert the most recently deleted entry. Returns `false` when there
    /// is nothing to undo.
    pub fn undo(&mut self) -> bool {
        let Some(deleted) = self.undo_stack.pop_back() else {
            return false;
        };

        let index = deleted.index.min(self.entries.len());
        self.completed.insert_key(&deleted.entry.pair_key);
        info!(
            "Restored history entry at {}: {} vs {}",
            index, deleted.entry.left, deleted.entry.right
        );
        self.entries.insert(index, deleted.entry);
        self.truncate_history();
        true
    }

    /// Flip the winner of one entry, re-rating both items from the entry's
    /// stored before-values. Later entries are left as they are.
    pub fn switch_winner(
        &mut self,
        index: usize,
        stats: &mut StatsStore,
        engine: &Glicko2,
    ) -> Result<(), RankingError> {
        self.check_index(index)?;
        let entry = &self.entries[index];

        let new_winner_side = entry.winner_side().other();
        let new_loser_side = new_winner_side.other();
        let new_winner = entry.name(new_winner_side).to_string();
        let new_loser = entry.name(new_loser_side).to_string();

        let outcome = BattleOutcome::compute(
            engine,
            &entry.snapshot(new_winner_side).state_before(),
            &entry.snapshot(new_loser_side).state_before(),
        )?;

        let mut winner_state = stats.get_or_default(&new_winner);
        let mut loser_state = stats.get_or_default(&new_loser);
        outcome.forward.apply(&mut winner_state, &mut loser_state);
        winner_state.wins += 1;
        winner_state.losses = winner_state.losses.saturating_sub(1);
        loser_state.wins = loser_state.wins.saturating_sub(1);
        loser_state.losses += 1;
        stats.set(&new_winner, winner_state);
        stats.set(&new_loser, loser_state);

        let ranks = stats.ranks();
        let winner_rank = ranks.get(&new_winner).copied().unwrap_or(0);
        let loser_rank = ranks.get(&new_loser).copied().unwrap_or(0);

        let entry = &mut self.entries[index];
        let mut winner_snapshot = *entry.snapshot(new_winner_side);
        let mut loser_snapshot = *entry.snapshot(new_loser_side);
        outcome.refresh(&mut winner_snapshot, &mut loser_snapshot, winner_rank, loser_rank);
        *entry.snapshot_mut(new_winner_side) = winner_snapshot;
        *entry.snapshot_mut(new_loser_side) = loser_snapshot;
        entry.winner = new_winner;
        entry.loser = new_loser;

        info!("Switched winner of entry {}: {} now beats {}", index, entry.winner, entry.loser);
        Ok(())
    }

    /// Re-add pair keys for entries whose key is missing. Returns how many
    /// keys were added.
    pub fn reconcile_pairs(&mut self) -> usize {
        let mut added = 0;
        for entry in &self.entries {
            if self.completed.insert_key(&entry.pair_key) {
                added += 1;
            }
        }
        added
    }

    fn check_index(&self, index: usize) -> Result<(), RankingError> {
        if index < self.entries.len() {
            return Ok(());
        }
        warn!("History index {} out of range ({} entries)", index, self.entries.len());
        Err(RankingError::InconsistentHistoryIndex {
            index,
            len: self.entries.len(),
        })
    }

    fn truncate_history(&mut self) {
        if self.entries.len() > self.max_history {
            let excess = self.entries.len() - self.max_history;
            self.entries.drain(..excess);
        }
    }

    fn truncate_undo(&mut self) {
        while self.undo_stack.len() > self.max_undo {
            self.undo_stack.pop_front();
        }
    }
}
