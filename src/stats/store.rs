use std::collections::HashMap;

use log::info;
use serde::{Deserialize, Serialize};

use super::migrate::{migrate_legacy, StoredStats};
use crate::rating::display::displayed_rating;
use crate::rating::types::RatingState;

/// One persisted stats entry. Stored as a list to keep insertion order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsRecord {
    pub name: String,
    pub stats: StoredStats,
}

/// A row of the display ranking.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedItem {
    pub position: usize,
    pub name: String,
    pub displayed_rating: f64,
    pub state: RatingState,
}

/// Rating state per item, keyed by item name, in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatsStore {
    order: Vec<String>,
    states: HashMap<String, RatingState>,
}

impl StatsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fresh default state for every name, in the given order.
    pub fn initialize<'a, I>(names: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut store = Self::new();
        for name in names {
            store.ensure(name);
        }
        store
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.states.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&RatingState> {
        self.states.get(name)
    }

    /// State of `name`, or the initial state when it has never been seen.
    pub fn get_or_default(&self, name: &str) -> RatingState {
        self.states.get(name).copied().unwrap_or_default()
    }

    /// Get the state for `name`, creating the initial state when missing.
    pub fn ensure(&mut self, name: &str) -> &mut RatingState {
        if !self.states.contains_key(name) {
            self.order.push(name.to_string());
        }
        self.states.entry(name.to_string()).or_default()
    }

    pub fn set(&mut self, name: &str, state: RatingState) {
        *self.ensure(name) = state;
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RatingState)> {
        self.order
            .iter()
            .filter_map(|name| self.states.get(name).map(|state| (name.as_str(), state)))
    }

    /// 1-based position by raw rating, highest first. Equal ratings keep
    /// insertion order.
    pub fn rank(&self, name: &str) -> Option<usize> {
        if !self.contains(name) {
            return None;
        }
        self.sorted_by_rating()
            .iter()
            .position(|(candidate, _)| *candidate == name)
            .map(|idx| idx + 1)
    }

    /// Rank of every item, computed with a single sort.
    pub fn ranks(&self) -> HashMap<String, usize> {
        self.sorted_by_rating()
            .into_iter()
            .enumerate()
            .map(|(idx, (name, _))| (name.to_string(), idx + 1))
            .collect()
    }

    /// Items ordered by displayed rating, the ranking a user sees.
    pub fn display_ranking(&self, base: f64, prior_weight: f64) -> Vec<RankedItem> {
        let mut rows: Vec<(&str, &RatingState, f64)> = self
            .iter()
            .map(|(name, state)| (name, state, displayed_rating(state, base, prior_weight)))
            .collect();
        rows.sort_by(|a, b| b.2.total_cmp(&a.2));

        rows.into_iter()
            .enumerate()
            .map(|(idx, (name, state, shown))| RankedItem {
                position: idx + 1,
                name: name.to_string(),
                displayed_rating: shown,
                state: *state,
            })
            .collect()
    }

    pub fn to_records(&self) -> Vec<StatsRecord> {
        self.iter()
            .map(|(name, state)| StatsRecord {
                name: name.to_string(),
                stats: StoredStats::from(*state),
            })
            .collect()
    }

    /// Build a store from persisted records, migrating legacy entries.
    pub fn from_records(records: Vec<StatsRecord>) -> Self {
        let mut store = Self::new();
        let mut migrated = 0;

        for record in records {
            if record.stats.is_legacy() {
                migrated += 1;
            }
            store.set(&record.name, migrate_legacy(record.stats));
        }

        if migrated > 0 {
            info!("Migrated {} legacy Elo records to Glicko-2", migrated);
        }
        store
    }

    fn sorted_by_rating(&self) -> Vec<(&str, &RatingState)> {
        let mut sorted: Vec<(&str, &RatingState)> = self.iter().collect();
        // sort_by is stable
        sorted.sort_by(|a, b| b.1.rating.total_cmp(&a.1.rating));
        sorted
    }
}
