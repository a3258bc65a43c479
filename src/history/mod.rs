mod ledger;
pub mod outcome;
pub mod types;
mod wizard;

pub use ledger::HistoryLedger;
pub use outcome::BattleOutcome;
pub use types::{BattleRecord, BattleSnapshot, DeletedEntry, Side, SideSnapshot};
pub use wizard::WizardReport;
