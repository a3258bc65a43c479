use serde::{Deserialize, Serialize};

fn default_operational() -> bool {
    true
}

/// A rankable item from the catalog
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Item {
    pub name: String,
    #[serde(default)]
    pub park: String,
    #[serde(default)]
    pub manufacturer: String,
    #[serde(default = "default_operational")]
    pub operational: bool,
}

impl Item {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            park: String::new(),
            manufacturer: String::new(),
            operational: true,
        }
    }

    /// "Name (Park)" when the park is known
    pub fn label(&self) -> String {
        if self.park.is_empty() {
            self.name.clone()
        } else {
            format!("{} ({})", self.name, self.park)
        }
    }
}

impl AsRef<str> for Item {
    fn as_ref(&self) -> &str {
        &self.name
    }
}

/// A pair offered to the user and not yet resolved
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingBattle {
    pub left: String,
    pub right: String,
}

/// Aggregate numbers shown by `summary`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub items: usize,
    pub total_battles: u64,
    pub average_battles_per_item: f64,
    pub completed_pairs: usize,
    pub possible_pairs: usize,
    pub completion_percent: f64,
    pub history_entries: usize,
    pub undo_depth: usize,
}
