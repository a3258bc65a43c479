use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use log::{info, warn};

use super::models::Item;
use crate::errors::catalog_context;

/// Ordered item catalog indexed by name
#[derive(Debug, Clone, Default)]
pub struct ItemCatalog {
    items: Vec<Item>,
    index: HashMap<String, usize>,
}

impl ItemCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a JSON array of items. Later duplicates of a name are ignored.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let context = catalog_context(&path.display().to_string());

        let json = fs::read_to_string(path).with_context(|| context.clone())?;
        let items: Vec<Item> = serde_json::from_str(&json).with_context(|| context.clone())?;

        let catalog = Self::from_items(items);
        info!(
            "Loaded {} items ({} operational) from {}",
            catalog.len(),
            catalog.operational().len(),
            path.display()
        );
        Ok(catalog)
    }

    pub fn from_items(items: Vec<Item>) -> Self {
        let mut catalog = Self::new();
        for item in items {
            catalog.add(item);
        }
        catalog
    }

    /// Returns `false` when an item with the same name is already present.
    pub fn add(&mut self, item: Item) -> bool {
        if self.index.contains_key(&item.name) {
            warn!("Duplicate catalog item '{}' ignored", item.name);
            return false;
        }
        self.index.insert(item.name.clone(), self.items.len());
        self.items.push(item);
        true
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Item> {
        self.index.get(name).map(|&idx| &self.items[idx])
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Items that can be offered in battles, in catalog order
    pub fn operational(&self) -> Vec<Item> {
        self.items.iter().filter(|item| item.operational).cloned().collect()
    }
}
