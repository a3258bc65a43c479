pub mod export;
pub mod keys;
mod memory;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::errors::{storage_context, with_parse_context};

pub use export::{ExportData, ExportDocument, EXPORT_VERSION};
pub use memory::MemoryStore;

/// Byte-oriented key/value persistence. Keys are namespaced per user, see
/// [`keys`].
pub trait PersistenceStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;
    fn set(&self, key: &str, value: &[u8]) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// Serialize `value` as JSON under `key`.
pub fn save_json<T: Serialize + ?Sized>(
    store: &dyn PersistenceStore,
    key: &str,
    value: &T,
) -> Result<()> {
    let bytes = serde_json::to_vec(value).with_context(|| format!("Failed to serialize {}", key))?;
    store.set(key, &bytes).context(storage_context("write", key))
}

/// Load and deserialize the JSON stored under `key`, if any.
pub fn load_json<T: DeserializeOwned>(
    store: &dyn PersistenceStore,
    key: &str,
) -> Result<Option<T>> {
    let bytes = store.get(key).context(storage_context("read", key))?;
    match bytes {
        Some(bytes) => Ok(Some(with_parse_context(serde_json::from_slice(&bytes), key)?)),
        None => Ok(None),
    }
}
