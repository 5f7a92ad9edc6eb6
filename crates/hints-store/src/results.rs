//! The live result set with its filters, sort order, selection and derived view.

use std::sync::Arc;

use hints_core::{Platform, Post};
use hints_engine::{merge, merge_json, view, Filters, MergeOutcome, SelectionSet, SortBy};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::StoreError;
use crate::kv::{load_snapshot, save_snapshot, KvStore};

pub const RESULTS_KEY: &str = "getsomehints-results";

/// Persisted part of the store; the display view is always recomputed.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultsSnapshot {
    #[serde(default)]
    pub results: Vec<Post>,
    #[serde(default)]
    pub filters: Filters,
    #[serde(default)]
    pub sort_by: SortBy,
    #[serde(default)]
    pub selected_posts: SelectionSet,
}

pub struct ResultsStore {
    kv: Arc<dyn KvStore>,
    state: ResultsSnapshot,
    display: Vec<Post>,
}

impl ResultsStore {
    /// Rehydrate from `kv` and recompute the view.
    #[must_use]
    pub fn load(kv: Arc<dyn KvStore>) -> Self {
        let state: ResultsSnapshot = load_snapshot(kv.as_ref(), RESULTS_KEY);
        tracing::debug!(
            results = state.results.len(),
            selected = state.selected_posts.len(),
            "results store loaded"
        );
        let mut store = Self {
            kv,
            state,
            display: Vec::new(),
        };
        store.refresh_view();
        store
    }

    #[must_use]
    pub fn results(&self) -> &[Post] {
        &self.state.results
    }

    /// Filtered and sorted posts, as displayed.
    #[must_use]
    pub fn view(&self) -> &[Post] {
        &self.display
    }

    #[must_use]
    pub fn filters(&self) -> &Filters {
        &self.state.filters
    }

    #[must_use]
    pub fn sort_by(&self) -> SortBy {
        self.state.sort_by
    }

    #[must_use]
    pub fn selection(&self) -> &SelectionSet {
        &self.state.selected_posts
    }

    /// Selected posts among those currently displayed, in display order.
    #[must_use]
    pub fn selected_posts(&self) -> Vec<Post> {
        self.state.selected_posts.selected_in(&self.display)
    }

    /// Merge a batch into the result set. Returns whether anything changed;
    /// an unchanged merge neither recomputes the view nor writes.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] when the snapshot cannot be written.
    pub fn set_results(&mut self, batch: &[Post]) -> Result<bool, StoreError> {
        let outcome = merge(&self.state.results, batch);
        self.apply(outcome)
    }

    /// Like [`ResultsStore::set_results`] for a raw backend payload; a
    /// non-array payload is ignored.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] when the snapshot cannot be written.
    pub fn set_results_json(&mut self, payload: &Value) -> Result<bool, StoreError> {
        let outcome = merge_json(&self.state.results, payload);
        self.apply(outcome)
    }

    /// # Errors
    ///
    /// Returns a [`StoreError`] when the snapshot cannot be written.
    pub fn add_result(&mut self, post: Post) -> Result<bool, StoreError> {
        self.set_results(std::slice::from_ref(&post))
    }

    /// # Errors
    ///
    /// Returns a [`StoreError`] when the snapshot cannot be written.
    pub fn set_platform_filter(&mut self, platforms: Vec<Platform>) -> Result<(), StoreError> {
        self.state.filters.platforms = platforms;
        self.refresh_view();
        self.persist()
    }

    /// # Errors
    ///
    /// Returns a [`StoreError`] when the snapshot cannot be written.
    pub fn set_keyword_filter(&mut self, keyword: impl Into<String>) -> Result<(), StoreError> {
        self.state.filters.keyword = keyword.into();
        self.refresh_view();
        self.persist()
    }

    /// # Errors
    ///
    /// Returns a [`StoreError`] when the snapshot cannot be written.
    pub fn set_sort_by(&mut self, sort_by: SortBy) -> Result<(), StoreError> {
        self.state.sort_by = sort_by;
        self.refresh_view();
        self.persist()
    }

    /// Toggle one key. Returns whether the key is now selected.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] when the snapshot cannot be written.
    pub fn toggle_selection(&mut self, key: &str) -> Result<bool, StoreError> {
        let selected = self.state.selected_posts.toggle(key);
        self.persist()?;
        Ok(selected)
    }

    /// Replace the selection with `keys`.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] when the snapshot cannot be written.
    pub fn select_all<I, S>(&mut self, keys: I) -> Result<(), StoreError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.state.selected_posts.select_all(keys);
        self.persist()
    }

    /// Select exactly the posts currently displayed.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] when the snapshot cannot be written.
    pub fn select_all_displayed(&mut self) -> Result<(), StoreError> {
        let keys: Vec<String> = self.display.iter().map(Post::key).collect();
        self.select_all(keys)
    }

    /// # Errors
    ///
    /// Returns a [`StoreError`] when the snapshot cannot be written.
    pub fn clear_selection(&mut self) -> Result<(), StoreError> {
        self.state.selected_posts.clear();
        self.persist()
    }

    /// Reset results, view, both filters and the selection together.
    /// The sort order is kept.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] when the snapshot cannot be written.
    pub fn clear(&mut self) -> Result<(), StoreError> {
        self.state = ResultsSnapshot {
            sort_by: self.state.sort_by,
            ..ResultsSnapshot::default()
        };
        self.display.clear();
        tracing::info!("results cleared");
        self.persist()
    }

    fn apply(&mut self, outcome: MergeOutcome) -> Result<bool, StoreError> {
        match outcome {
            MergeOutcome::Unchanged => Ok(false),
            MergeOutcome::Changed(posts) => {
                tracing::debug!(
                    before = self.state.results.len(),
                    after = posts.len(),
                    "results merged"
                );
                self.state.results = posts;
                self.refresh_view();
                self.persist()?;
                Ok(true)
            }
        }
    }

    fn refresh_view(&mut self) {
        self.display = view(&self.state.results, &self.state.filters, self.state.sort_by);
    }

    fn persist(&self) -> Result<(), StoreError> {
        save_snapshot(self.kv.as_ref(), RESULTS_KEY, &self.state)
    }
}

#[cfg(test)]
mod tests {
    use hints_core::{Author, TimeValue};
    use serde_json::json;

    use super::*;
    use crate::kv::MemoryStore;

    fn post(platform: Platform, id: &str, title: &str, likes: u64) -> Post {
        Post {
            platform: platform.clone(),
            post_id: id.to_string(),
            title: title.to_string(),
            content: String::new(),
            author: Author {
                author_id: "u".to_string(),
                author_name: "someone".to_string(),
                platform,
                ..Author::default()
            },
            publish_time: TimeValue::Missing,
            like_count: likes,
            comment_count: 0,
            share_count: 0,
            collect_count: None,
            url: String::new(),
            image_urls: Vec::new(),
            video_url: None,
            platform_data: serde_json::Map::new(),
        }
    }

    fn keys(posts: &[Post]) -> Vec<String> {
        posts.iter().map(Post::key).collect()
    }

    #[test]
    fn set_results_merges_and_reports_change() {
        let mut store = ResultsStore::load(Arc::new(MemoryStore::new()));
        assert!(store
            .set_results(&[post(Platform::Douyin, "1", "a", 5)])
            .unwrap());
        assert!(!store.set_results(&[]).unwrap());
        assert!(!store
            .set_results(&[post(Platform::Douyin, "1", "a", 5)])
            .unwrap());
        assert!(store
            .set_results(&[post(Platform::Xhs, "2", "b", 1)])
            .unwrap());
        assert_eq!(store.results().len(), 2);
    }

    #[test]
    fn filters_and_sort_recompute_view() {
        let mut store = ResultsStore::load(Arc::new(MemoryStore::new()));
        store
            .set_results(&[
                post(Platform::Douyin, "1", "cat", 5),
                post(Platform::Xhs, "2", "dog", 50),
                post(Platform::Xhs, "3", "Cats again", 10),
            ])
            .unwrap();

        store.set_sort_by(SortBy::Hot).unwrap();
        assert_eq!(keys(store.view()), vec!["xhs-2", "xhs-3", "dy-1"]);

        store.set_platform_filter(vec![Platform::Xhs]).unwrap();
        store.set_keyword_filter("CAT").unwrap();
        assert_eq!(keys(store.view()), vec!["xhs-3"]);
    }

    #[test]
    fn add_result_replaces_same_key_in_place() {
        let mut store = ResultsStore::load(Arc::new(MemoryStore::new()));
        store
            .set_results(&[post(Platform::Xhs, "1", "old", 1), post(Platform::Xhs, "2", "b", 2)])
            .unwrap();

        assert!(store.add_result(post(Platform::Xhs, "1", "new", 9)).unwrap());
        assert_eq!(keys(store.results()), vec!["xhs-1", "xhs-2"]);
        assert_eq!(store.results()[0].title, "new");
    }

    #[test]
    fn non_array_payload_is_ignored() {
        let mut store = ResultsStore::load(Arc::new(MemoryStore::new()));
        assert!(!store.set_results_json(&json!({ "detail": "not ready" })).unwrap());
        assert!(store.results().is_empty());
    }

    #[test]
    fn selection_follows_display_order() {
        let mut store = ResultsStore::load(Arc::new(MemoryStore::new()));
        store
            .set_results(&[
                post(Platform::Douyin, "1", "a", 1),
                post(Platform::Douyin, "2", "b", 9),
            ])
            .unwrap();
        store.set_sort_by(SortBy::Hot).unwrap();
        store.select_all_displayed().unwrap();
        assert!(store.toggle_selection("dy-9").unwrap(), "stale keys may be selected");

        assert_eq!(keys(&store.selected_posts()), vec!["dy-2", "dy-1"]);
        store.clear_selection().unwrap();
        assert!(store.selected_posts().is_empty());
    }

    #[test]
    fn clear_resets_everything_but_sort() {
        let mut store = ResultsStore::load(Arc::new(MemoryStore::new()));
        store.set_results(&[post(Platform::Douyin, "1", "a", 1)]).unwrap();
        store.set_keyword_filter("a").unwrap();
        store.set_platform_filter(vec![Platform::Douyin]).unwrap();
        store.set_sort_by(SortBy::Comments).unwrap();
        store.toggle_selection("dy-1").unwrap();

        store.clear().unwrap();
        assert!(store.results().is_empty());
        assert!(store.view().is_empty());
        assert_eq!(store.filters(), &Filters::default());
        assert!(store.selection().is_empty());
        assert_eq!(store.sort_by(), SortBy::Comments);
    }

    #[test]
    fn malformed_selection_keeps_persisted_results() {
        let kv = Arc::new(MemoryStore::new());
        kv.set(
            RESULTS_KEY,
            r#"{"state":{"results":[{"platform":"xhs","post_id":"1","title":"kept"}],"selectedPosts":{}},"version":0}"#,
        )
        .unwrap();

        let store = ResultsStore::load(kv);
        assert_eq!(store.results().len(), 1);
        assert_eq!(store.view().len(), 1);
        assert!(store.selection().is_empty());
    }

    #[test]
    fn snapshot_uses_browser_field_names() {
        let kv = Arc::new(MemoryStore::new());
        let mut store = ResultsStore::load(kv.clone());
        store.set_results(&[post(Platform::Douyin, "1", "a", 1)]).unwrap();
        store.toggle_selection("dy-1").unwrap();

        let raw: Value = serde_json::from_str(&kv.get(RESULTS_KEY).unwrap().unwrap()).unwrap();
        assert_eq!(raw["state"]["sortBy"], "time");
        assert_eq!(raw["state"]["selectedPosts"], json!(["dy-1"]));
        assert_eq!(raw["state"]["filters"], json!({ "platforms": [], "keyword": "" }));
        assert!(raw["state"].get("filteredResults").is_none());
    }
}
