//! Merging incoming result batches into the de-duplicated live result set.

use std::collections::{HashMap, HashSet};

use hints_core::Post;
use serde_json::Value;

/// Result of [`merge`]: either a new list or a signal that nothing changed.
#[derive(Debug, Clone, PartialEq)]
pub enum MergeOutcome {
    /// The incoming batch was empty or added no new keys; skip recomputation.
    Unchanged,
    Changed(Vec<Post>),
}

impl MergeOutcome {
    #[must_use]
    pub fn is_changed(&self) -> bool {
        matches!(self, MergeOutcome::Changed(_))
    }

    /// The merged list, or `existing` itself when nothing changed.
    #[must_use]
    pub fn into_posts(self, existing: Vec<Post>) -> Vec<Post> {
        match self {
            MergeOutcome::Unchanged => existing,
            MergeOutcome::Changed(posts) => posts,
        }
    }
}

/// Merge `incoming` into `existing`, keyed by `(platform, post_id)`.
///
/// Existing records keep their position; a later record with the same key
/// replaces the earlier one in place (last write wins, also within
/// `incoming`); new keys are appended in the order first seen.
///
/// Returns [`MergeOutcome::Unchanged`] when `incoming` is empty, or when the
/// merged key set equals the existing key set and no record's fields differ
/// from what is already held.
#[must_use]
pub fn merge(existing: &[Post], incoming: &[Post]) -> MergeOutcome {
    if incoming.is_empty() {
        return MergeOutcome::Unchanged;
    }

    let mut order: Vec<String> = Vec::with_capacity(existing.len() + incoming.len());
    let mut by_key: HashMap<String, &Post> = HashMap::with_capacity(order.capacity());

    for post in existing.iter().chain(incoming) {
        let key = post.key();
        if by_key.insert(key.clone(), post).is_none() {
            order.push(key);
        }
    }

    let existing_keys: HashSet<String> = existing.iter().map(Post::key).collect();
    let same_keys =
        order.len() == existing_keys.len() && order.iter().all(|k| existing_keys.contains(k));
    if same_keys && existing.iter().all(|p| by_key.get(&p.key()) == Some(&p)) {
        return MergeOutcome::Unchanged;
    }

    let merged = order
        .iter()
        .filter_map(|key| by_key.get(key).map(|post| (*post).clone()))
        .collect();
    MergeOutcome::Changed(merged)
}

/// Merge a raw JSON payload from the results boundary.
///
/// A payload that is not an array is ignored entirely. Array items that do
/// not parse as a [`Post`] are skipped.
#[must_use]
pub fn merge_json(existing: &[Post], payload: &Value) -> MergeOutcome {
    let Value::Array(items) = payload else {
        tracing::debug!("ignoring non-array results payload");
        return MergeOutcome::Unchanged;
    };

    let incoming: Vec<Post> = items
        .iter()
        .filter_map(|item| match serde_json::from_value::<Post>(item.clone()) {
            Ok(post) => Some(post),
            Err(e) => {
                tracing::debug!(error = %e, "skipping malformed post in results payload");
                None
            }
        })
        .collect();

    merge(existing, &incoming)
}
