use anyhow::{bail, Context, Result};
use log::{debug, info, warn};
use serde::Serialize;

use crate::config::settings::{AppConfig, HistorySettings, PairingSettings};
use crate::domain::{Item, ItemCatalog, PendingBattle, Summary};
use crate::errors::RankingError;
use crate::history::{BattleRecord, DeletedEntry, HistoryLedger, Side, WizardReport};
use crate::pairing::{select_pair, total_pairs, CompletedPairs, RandomSource};
use crate::rating::Glicko2;
use crate::stats::{RankedItem, StatsRecord, StatsStore};
use crate::storage::{keys, load_json, save_json, ExportData, ExportDocument, PersistenceStore};

/// All ranking state of one user plus the store it is persisted in.
///
/// Every mutating operation saves what it touched. Failed writes do not
/// fail the operation: they are logged and collected as warnings, and the
/// in-memory state stays authoritative.
pub struct Session {
    pub(super) user: String,
    pub(super) items: Vec<Item>,
    pub(super) stats: StatsStore,
    pub(super) ledger: HistoryLedger,
    pub(super) tuning: PairingSettings,
    pub(super) total_battles: u64,
    pub(super) current: Option<PendingBattle>,
    pub(super) engine: Glicko2,
    pub(super) history_settings: HistorySettings,
    store: Box<dyn PersistenceStore>,
    warnings: Vec<String>,
}

/// Which parts of the session a save should write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Part {
    Stats,
    History,
    Pairs,
    Undo,
    Battles,
    Pairing,
    Current,
}

impl Part {
    pub(super) const ALL: [Part; 7] = [
        Part::Stats,
        Part::History,
        Part::Pairs,
        Part::Undo,
        Part::Battles,
        Part::Pairing,
        Part::Current,
    ];
}

impl Session {
    /// Load the user's data and make sure every operational catalog item has
    /// a rating state.
    pub fn open(
        config: &AppConfig,
        catalog: &ItemCatalog,
        store: Box<dyn PersistenceStore>,
    ) -> Result<Self> {
        let user = config.storage.user.clone();
        let items = catalog.operational();

        let records: Vec<StatsRecord> =
            load_json(store.as_ref(), &keys::stats(&user))?.unwrap_or_default();
        let mut stats = StatsStore::from_records(records);
        for item in &items {
            stats.ensure(&item.name);
        }

        let history: Vec<BattleRecord> =
            load_json(store.as_ref(), &keys::history(&user))?.unwrap_or_default();
        let undo: Vec<DeletedEntry> =
            load_json(store.as_ref(), &keys::undo(&user))?.unwrap_or_default();
        let completed: CompletedPairs =
            load_json(store.as_ref(), &keys::pairs(&user))?.unwrap_or_default();
        let ledger = HistoryLedger::from_parts(&config.history, history, undo, completed);

        let mut tuning: PairingSettings = load_json(store.as_ref(), &keys::pairing(&user))?
            .unwrap_or_else(|| config.pairing.clone());
        // Only the powers are persisted.
        tuning.base_rating = config.rating.base_rating;
        let total_battles: u64 =
            load_json(store.as_ref(), &keys::battles(&user))?.unwrap_or(0);
        let current =
            load_json::<Option<PendingBattle>>(store.as_ref(), &keys::current(&user))?.flatten();

        info!(
            "Session for '{}': {} items, {} battles in history, {} completed pairs",
            user,
            items.len(),
            ledger.len(),
            ledger.completed().len()
        );

        Ok(Self {
            user,
            items,
            stats,
            ledger,
            tuning,
            total_battles,
            current,
            engine: Glicko2::new(config.rating.clone()),
            history_settings: config.history.clone(),
            store,
            warnings: Vec::new(),
        })
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn stats(&self) -> &StatsStore {
        &self.stats
    }

    pub fn ledger(&self) -> &HistoryLedger {
        &self.ledger
    }

    pub fn tuning(&self) -> &PairingSettings {
        &self.tuning
    }

    pub fn engine(&self) -> &Glicko2 {
        &self.engine
    }

    pub fn total_battles(&self) -> u64 {
        self.total_battles
    }

    pub fn current_battle(&self) -> Option<&PendingBattle> {
        self.current.as_ref()
    }

    /// Drain the warnings collected since the last call.
    pub fn take_warnings(&mut self) -> Vec<String> {
        std::mem::take(&mut self.warnings)
    }

    /// The pending battle, selecting and persisting a new one when there is
    /// none or the stored one is no longer valid. `None` once every pair has
    /// been battled.
    pub fn next_battle(&mut self, rng: &mut dyn RandomSource) -> Option<PendingBattle> {
        if let Some(current) = &self.current {
            if self.is_open(&current.left, &current.right) {
                return Some(current.clone());
            }
            debug!("Dropping stale pending battle {} vs {}", current.left, current.right);
        }

        let completed = self.ledger.completed();
        let next = select_pair(&self.items, &self.stats, completed, &self.tuning, rng).map(
            |(left, right)| PendingBattle {
                left: left.name.clone(),
                right: right.name.clone(),
            },
        );
        if next.is_none() {
            info!("All {} pairs have been battled", total_pairs(self.items.len()));
        }

        self.current = next.clone();
        self.save(&[Part::Current]);
        next
    }

    /// Resolve the pending battle in favour of `winner`.
    pub fn resolve(&mut self, winner: Side) -> Result<BattleRecord> {
        let Some(pending) = self.current.clone() else {
            bail!("No battle is pending, run `next` first");
        };
        if !self.is_open(&pending.left, &pending.right) {
            warn!("Pending battle {} vs {} is no longer open", pending.left, pending.right);
            self.current = None;
            self.save(&[Part::Current]);
            bail!(
                "{} vs {} has already been battled, run `next` for a new pair",
                pending.left,
                pending.right
            );
        }

        let record = self.apply_battle(&pending.left, &pending.right, winner)?;
        self.current = None;
        self.save(&Part::ALL);
        Ok(record)
    }

    pub fn delete(&mut self, index: usize) -> Result<BattleRecord> {
        let removed = self.ledger.delete(index)?;
        self.save(&[Part::History, Part::Pairs, Part::Undo]);
        Ok(removed)
    }

    /// Returns `false` when nothing was deleted.
    pub fn undo(&mut self) -> bool {
        let restored = self.ledger.undo();
        if restored {
            self.save(&[Part::History, Part::Pairs, Part::Undo]);
        }
        restored
    }

    pub fn switch_winner(&mut self, index: usize) -> Result<()> {
        self.ledger.switch_winner(index, &mut self.stats, &self.engine)?;
        self.save(&[Part::Stats, Part::History]);
        Ok(())
    }

    pub fn run_wizard(&mut self) -> Result<WizardReport> {
        let report = self.ledger.recompute_all(
            &mut self.stats,
            &self.engine,
            self.history_settings.max_wizard_iterations,
        )?;
        self.save(&[Part::Stats, Part::History]);
        Ok(report)
    }

    /// Update the persisted selector tuning. Powers must be finite and not
    /// negative.
    pub fn tune(
        &mut self,
        exploration: Option<f64>,
        proximity: Option<f64>,
    ) -> Result<&PairingSettings> {
        for (label, value) in [("exploration", exploration), ("proximity", proximity)] {
            if let Some(value) = value {
                if !value.is_finite() || value < 0.0 {
                    bail!("{} power must be a non-negative number, got {}", label, value);
                }
            }
        }

        if let Some(value) = exploration {
            self.tuning.exploration_power = value;
        }
        if let Some(value) = proximity {
            self.tuning.proximity_power = value;
        }
        self.save(&[Part::Pairing]);
        Ok(&self.tuning)
    }

    /// Items ordered by displayed rating.
    pub fn ranking(&self) -> Vec<RankedItem> {
        self.stats
            .display_ranking(self.engine.settings().base_rating, self.tuning.prior_weight)
    }

    pub fn summary(&self) -> Summary {
        let items = self.items.len();
        let possible_pairs = total_pairs(items);
        let completed_pairs = self.ledger.completed().count_among(&self.items);

        let battles_sum: u64 = self
            .items
            .iter()
            .filter_map(|item| self.stats.get(&item.name))
            .map(|state| state.battles as u64)
            .sum();

        Summary {
            items,
            total_battles: self.total_battles,
            average_battles_per_item: if items == 0 {
                0.0
            } else {
                battles_sum as f64 / items as f64
            },
            completed_pairs,
            possible_pairs,
            completion_percent: if possible_pairs == 0 {
                0.0
            } else {
                completed_pairs as f64 * 100.0 / possible_pairs as f64
            },
            history_entries: self.ledger.len(),
            undo_depth: self.ledger.undo_depth(),
        }
    }

    /// Start over: fresh ratings for the catalog, empty history.
    pub fn reset(&mut self) {
        self.stats = StatsStore::initialize(self.items.iter().map(|item| item.name.as_str()));
        self.ledger.clear();
        self.total_battles = 0;
        self.current = None;

        for key in keys::all(&self.user) {
            if let Err(e) = self.store.remove(&key) {
                self.warn_write_failure(key, e);
            }
        }
        self.save(&[Part::Stats, Part::Pairing]);
        info!("Reset ranking for '{}'", self.user);
    }

    pub fn export_document(&self) -> ExportDocument {
        ExportDocument::new(
            &self.user,
            ExportData {
                stats: self.stats.to_records(),
                total_battles: self.total_battles,
                history: self.ledger.entries().to_vec(),
                completed_pairs: self.ledger.completed().clone(),
                pairing_settings: self.tuning.clone(),
            },
        )
    }

    /// Replace this user's data with an exported document.
    pub fn import_document(&mut self, document: ExportDocument) {
        if document.user != self.user {
            warn!("Importing data exported by '{}' into '{}'", document.user, self.user);
        }

        let data = document.data;
        let mut stats = StatsStore::from_records(data.stats);
        for item in &self.items {
            stats.ensure(&item.name);
        }

        self.stats = stats;
        self.ledger = HistoryLedger::from_parts(
            &self.history_settings,
            data.history,
            Vec::new(),
            data.completed_pairs,
        );
        self.total_battles = data.total_battles;
        self.tuning.exploration_power = data.pairing_settings.exploration_power;
        self.tuning.proximity_power = data.pairing_settings.proximity_power;
        self.current = None;
        self.save(&Part::ALL);

        info!("Imported {} battles for '{}'", self.ledger.len(), self.user);
    }

    /// Rate and record one battle between two named items.
    pub(super) fn apply_battle(
        &mut self,
        left: &str,
        right: &str,
        winner: Side,
    ) -> Result<BattleRecord> {
        if left == right {
            bail!("An item cannot battle itself: {}", left);
        }
        let record = self
            .ledger
            .record_battle(&mut self.stats, &self.engine, left, right, winner)
            .with_context(|| format!("Failed to rate {} vs {}", left, right))?
            .clone();
        self.total_battles += 1;
        Ok(record)
    }

    fn is_open(&self, left: &str, right: &str) -> bool {
        let listed = |name: &str| self.items.iter().any(|item| item.name == name);
        left != right
            && listed(left)
            && listed(right)
            && !self.ledger.completed().contains(left, right)
    }

    /// Write the given parts, turning failures into warnings.
    pub(super) fn save(&mut self, parts: &[Part]) {
        for part in parts {
            let key;
            let result = match part {
                Part::Stats => {
                    key = keys::stats(&self.user);
                    save_json(self.store.as_ref(), &key, &self.stats.to_records())
                }
                Part::History => {
                    key = keys::history(&self.user);
                    save_json(self.store.as_ref(), &key, self.ledger.entries())
                }
                Part::Pairs => {
                    key = keys::pairs(&self.user);
                    save_json(self.store.as_ref(), &key, self.ledger.completed())
                }
                Part::Undo => {
                    key = keys::undo(&self.user);
                    let undo: Vec<&DeletedEntry> = self.ledger.undo_stack().collect();
                    save_json(self.store.as_ref(), &key, &undo)
                }
                Part::Battles => {
                    key = keys::battles(&self.user);
                    save_json(self.store.as_ref(), &key, &self.total_battles)
                }
                Part::Pairing => {
                    key = keys::pairing(&self.user);
                    save_json(self.store.as_ref(), &key, &self.tuning)
                }
                Part::Current => {
                    key = keys::current(&self.user);
                    save_json(self.store.as_ref(), &key, &self.current)
                }
            };

            if let Err(e) = result {
                self.warn_write_failure(key, e);
            }
        }
    }

    fn warn_write_failure(&mut self, key: String, error: anyhow::Error) {
        let failure = RankingError::PersistenceWriteFailure {
            key,
            message: format!("{:#}", error),
        };
        warn!("{}", failure);
        self.warnings.push(failure.to_string());
    }
}

/// Result of a bulk simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SimulationReport {
    pub requested: usize,
    pub resolved: usize,
    pub failed: usize,
    pub exhausted: bool,
}
