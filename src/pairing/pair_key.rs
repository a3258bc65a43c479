use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

pub const PAIR_KEY_SEPARATOR: &str = "|||";

/// Order-independent key of an unordered pair.
pub fn pair_key(a: &str, b: &str) -> String {
    if a <= b {
        format!("{a}{PAIR_KEY_SEPARATOR}{b}")
    } else {
        format!("{b}{PAIR_KEY_SEPARATOR}{a}")
    }
}

/// Unordered pairs that have already been battled.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompletedPairs {
    keys: BTreeSet<String>,
}

impl CompletedPairs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, a: &str, b: &str) -> bool {
        self.keys.insert(pair_key(a, b))
    }

    pub fn insert_key(&mut self, key: &str) -> bool {
        self.keys.insert(key.to_string())
    }

    pub fn remove_key(&mut self, key: &str) -> bool {
        self.keys.remove(key)
    }

    pub fn contains(&self, a: &str, b: &str) -> bool {
        self.keys.contains(&pair_key(a, b))
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn clear(&mut self) {
        self.keys.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(String::as_str)
    }

    /// Completed pairs whose two members are both in `names`. Keys left over
    /// from items that are no longer listed are not counted.
    pub fn count_among<S: AsRef<str>>(&self, names: &[S]) -> usize {
        let present: HashSet<&str> = names.iter().map(AsRef::as_ref).collect();
        self.keys
            .iter()
            .filter_map(|key| key.split_once(PAIR_KEY_SEPARATOR))
            .filter(|(a, b)| a != b && present.contains(a) && present.contains(b))
            .count()
    }

    /// True when every unordered pair of `names` has been battled.
    pub fn is_exhausted<S: AsRef<str>>(&self, names: &[S]) -> bool {
        let total = total_pairs(names.len());
        total > 0 && self.count_among(names) >= total
    }
}

impl FromIterator<String> for CompletedPairs {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self {
            keys: iter.into_iter().collect(),
        }
    }
}

pub fn total_pairs(n: usize) -> usize {
    n * n.saturating_sub(1) / 2
}
