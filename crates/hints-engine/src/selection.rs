use std::collections::{BTreeSet, HashSet};

use hints_core::Post;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// User-chosen subset of displayed posts, by composite key (`"dy-123"`).
///
/// Iteration order carries no meaning; use [`SelectionSet::selected_in`] to
/// get the selected posts in display order. Persisted as a sorted key list.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SelectionSet {
    keys: HashSet<String>,
}

impl SelectionSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `key` if absent, remove it if present. Returns whether it is now selected.
    pub fn toggle(&mut self, key: &str) -> bool {
        if self.keys.remove(key) {
            false
        } else {
            self.keys.insert(key.to_string());
            true
        }
    }

    /// Replace the whole selection with `keys`.
    pub fn select_all<I, S>(&mut self, keys: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keys = keys.into_iter().map(Into::into).collect();
    }

    pub fn clear(&mut self) {
        self.keys.clear();
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Selected posts from `display`, in display order. Stale keys are ignored.
    #[must_use]
    pub fn selected_in(&self, display: &[Post]) -> Vec<Post> {
        display
            .iter()
            .filter(|post| self.keys.contains(&post.key()))
            .cloned()
            .collect()
    }

    /// Keys in sorted order.
    #[must_use]
    pub fn to_sorted_vec(&self) -> Vec<String> {
        self.keys.iter().cloned().collect::<BTreeSet<_>>().into_iter().collect()
    }
}

impl Serialize for SelectionSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_sorted_vec().serialize(serializer)
    }
}

/// Accepts any JSON value: an array keeps its string entries, anything else
/// rehydrates as an empty selection so the rest of a snapshot still loads.
impl<'de> Deserialize<'de> for SelectionSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let keys = match Value::deserialize(deserializer)? {
            Value::Array(items) => items
                .into_iter()
                .filter_map(|item| match item {
                    Value::String(key) => Some(key),
                    _ => None,
                })
                .collect(),
            Value::Null => HashSet::new(),
            other => {
                tracing::warn!(found = %other, "selection is not an array; starting empty");
                HashSet::new()
            }
        };
        Ok(Self { keys })
    }
}
