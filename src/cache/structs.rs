use anyhow::{Context, Result};
use log::{debug, info};
use std::fs;
use std::path::{Path, PathBuf};

use crate::storage::PersistenceStore;

/// File-based store: one pretty-printed JSON file per key
pub struct JsonFileStore {
    data_dir: PathBuf,
}

impl JsonFileStore {
    /// Create a new store rooted at `data_dir`
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Result<Self> {
        let data_dir = data_dir.as_ref().to_path_buf();

        fs::create_dir_all(&data_dir).context("Failed to create data directory")?;

        Ok(Self { data_dir })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Check if a value exists for key
    pub fn exists(&self, key: &str) -> bool {
        self.build_path(key).exists()
    }

    /// Remove every stored file
    pub fn clear(&self) -> Result<()> {
        fs::remove_dir_all(&self.data_dir).context("Failed to clear data directory")?;

        fs::create_dir_all(&self.data_dir).context("Failed to recreate data directory")?;

        info!("Cleared data directory {}", self.data_dir.display());
        Ok(())
    }

    // --- Helper Methods ---

    fn build_path(&self, key: &str) -> PathBuf {
        self.data_dir.join(format!("{}.json", file_stem(key)))
    }

    /// Values are JSON already; re-indent them so the files stay readable.
    fn write_json(&self, path: &Path, value: &[u8]) -> Result<()> {
        let contents = match serde_json::from_slice::<serde_json::Value>(value) {
            Ok(json) => serde_json::to_vec_pretty(&json)?,
            Err(_) => value.to_vec(),
        };

        // Write to a sibling first so a crash never leaves a half-written file.
        let temp_path = path.with_extension("json.tmp");
        fs::write(&temp_path, contents).context("Failed to write data file")?;
        fs::rename(&temp_path, path).context("Failed to replace data file")?;
        Ok(())
    }

    fn read_opt(&self, path: &Path) -> Result<Option<Vec<u8>>> {
        if !path.exists() {
            return Ok(None);
        }

        let bytes = fs::read(path).with_context(|| format!("Failed to read data file {:?}", path))?;
        Ok(Some(bytes))
    }
}

impl PersistenceStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.build_path(key);
        let value = self.read_opt(&path)?;
        if value.is_some() {
            debug!("Loaded {} from {}", key, path.display());
        }
        Ok(value)
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        let path = self.build_path(key);
        self.write_json(&path, value)?;
        debug!("Saved {} to {}", key, path.display());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.build_path(key);
        if path.exists() {
            fs::remove_file(&path)
                .with_context(|| format!("Failed to remove data file {:?}", path))?;
        }
        Ok(())
    }
}

/// `stats:ana` -> `stats%3Aana`. Percent-encoding is reversible, so distinct
/// keys never share a file.
fn file_stem(key: &str) -> String {
    urlencoding::encode(key).into_owned()
}
