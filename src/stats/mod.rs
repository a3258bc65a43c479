mod migrate;
mod store;

pub use migrate::{migrate_legacy, LegacyStats, StoredStats};
pub use store::{RankedItem, StatsRecord, StatsStore};
