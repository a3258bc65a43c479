pub mod settings;

pub use settings::{AppConfig, HistorySettings, PairingSettings, RatingSettings, StorageSettings};
