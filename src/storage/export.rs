use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::settings::PairingSettings;
use crate::history::BattleRecord;
use crate::pairing::CompletedPairs;
use crate::stats::StatsRecord;

pub const EXPORT_VERSION: &str = "1.0";

/// Complete data of one user, as written by `export` and read by `import`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub version: String,
    pub export_date: DateTime<Utc>,
    pub user: String,
    pub data: ExportData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportData {
    pub stats: Vec<StatsRecord>,
    #[serde(default)]
    pub total_battles: u64,
    #[serde(default)]
    pub history: Vec<BattleRecord>,
    #[serde(default)]
    pub completed_pairs: CompletedPairs,
    #[serde(default)]
    pub pairing_settings: PairingSettings,
}

impl ExportDocument {
    pub fn new(user: &str, data: ExportData) -> Self {
        Self {
            version: EXPORT_VERSION.to_string(),
            export_date: Utc::now(),
            user: user.to_string(),
            data,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a document, rejecting versions this crate does not understand.
    pub fn from_json(json: &str) -> Result<Self> {
        let document: ExportDocument = serde_json::from_str(json)?;
        if document.version != EXPORT_VERSION {
            bail!(
                "Unsupported export version '{}' (expected '{}')",
                document.version,
                EXPORT_VERSION
            );
        }
        Ok(document)
    }
}
