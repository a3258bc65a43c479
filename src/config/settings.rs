use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::rating::types::BASE_RATING;

#[derive(Debug, Clone)]
pub struct RatingSettings {
    pub base_rating: f64,
    /// Glicko-2 system constant, constrains how fast volatility moves.
    pub tau: f64,
    pub epsilon: f64,
    pub scale_factor: f64,
    pub max_solver_iterations: usize,
}

impl Default for RatingSettings {
    fn default() -> Self {
        Self {
            base_rating: BASE_RATING,
            tau: 0.5,
            epsilon: 0.000001,
            scale_factor: 173.7178,
            max_solver_iterations: 100,
        }
    }
}

/// Tuning for the pairing selector. Exploration and proximity are persisted
/// per user, the rest are fixed defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PairingSettings {
    pub exploration_power: f64,
    pub proximity_power: f64,
    /// Rating displayed ratings are pulled toward. Follows `RatingSettings::base_rating`.
    #[serde(skip, default = "default_base_rating")]
    pub base_rating: f64,
    #[serde(skip, default = "default_prior_weight")]
    pub prior_weight: f64,
    #[serde(skip, default = "default_rating_diff_scale")]
    pub rating_diff_scale: f64,
    #[serde(skip, default = "default_attempts")]
    pub attempts: usize,
    #[serde(skip, default = "default_collision_retries")]
    pub collision_retries: usize,
}

fn default_base_rating() -> f64 {
    BASE_RATING
}

fn default_prior_weight() -> f64 {
    6.0
}

fn default_rating_diff_scale() -> f64 {
    400.0
}

fn default_attempts() -> usize {
    200
}

fn default_collision_retries() -> usize {
    8
}

impl Default for PairingSettings {
    fn default() -> Self {
        Self {
            exploration_power: 2.0,
            proximity_power: 0.1,
            base_rating: default_base_rating(),
            prior_weight: default_prior_weight(),
            rating_diff_scale: default_rating_diff_scale(),
            attempts: default_attempts(),
            collision_retries: default_collision_retries(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct HistorySettings {
    pub max_history: usize,
    pub max_undo: usize,
    pub max_wizard_iterations: usize,
    pub simulation_batch_size: usize,
}

impl Default for HistorySettings {
    fn default() -> Self {
        Self {
            max_history: 10_000,
            max_undo: 50,
            max_wizard_iterations: 50,
            simulation_batch_size: 200,
        }
    }
}

#[derive(Debug, Clone)]
pub struct StorageSettings {
    pub data_dir: PathBuf,
    pub database_path: Option<PathBuf>,
    pub user: String,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            database_path: None,
            user: "default".to_string(),
        }
    }
}

impl StorageSettings {
    /// Defaults overridden by `RANKER_DATA_DIR`, `RANKER_DATABASE_PATH` and `RANKER_USER`.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            data_dir: std::env::var("RANKER_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            database_path: std::env::var("RANKER_DATABASE_PATH")
                .ok()
                .map(PathBuf::from),
            user: std::env::var("RANKER_USER").unwrap_or(defaults.user),
        }
    }
}

pub struct AppConfig {
    pub rating: RatingSettings,
    pub pairing: PairingSettings,
    pub history: HistorySettings,
    pub storage: StorageSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl AppConfig {
    pub fn new() -> Self {
        let rating = RatingSettings::default();
        let pairing = PairingSettings {
            base_rating: rating.base_rating,
            ..PairingSettings::default()
        };
        Self {
            rating,
            pairing,
            history: HistorySettings::default(),
            storage: StorageSettings::from_env(),
        }
    }
}
