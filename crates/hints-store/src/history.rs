//! Newest-first log of finished search runs.

use std::collections::HashSet;
use std::sync::Arc;

use hints_core::HistoryRecord;
use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::kv::{load_snapshot, save_snapshot, KvStore};

pub const HISTORY_KEY: &str = "getsomehints-history";

#[derive(Debug, Default, Serialize, Deserialize)]
struct HistoryState {
    #[serde(default)]
    records: Vec<HistoryRecord>,
}

pub struct HistoryLog {
    kv: Arc<dyn KvStore>,
    state: HistoryState,
}

impl HistoryLog {
    /// Load the log from `kv`; unreadable snapshots start an empty log.
    #[must_use]
    pub fn load(kv: Arc<dyn KvStore>) -> Self {
        let state: HistoryState = load_snapshot(kv.as_ref(), HISTORY_KEY);
        tracing::debug!(records = state.records.len(), "history loaded");
        Self { kv, state }
    }

    /// Records, newest first.
    #[must_use]
    pub fn records(&self) -> &[HistoryRecord] {
        &self.state.records
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&HistoryRecord> {
        self.state.records.iter().find(|r| r.id == id)
    }

    /// Insert `record` at the head of the log.
    ///
    /// The id is the originating task id; an older record with the same id is
    /// replaced so ids stay unique.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] when the snapshot cannot be written.
    pub fn add(&mut self, record: HistoryRecord) -> Result<(), StoreError> {
        self.state.records.retain(|r| r.id != record.id);
        tracing::info!(
            id = %record.id,
            keyword = %record.keyword,
            status = %record.status,
            total_found = record.total_found,
            "history record added"
        );
        self.state.records.insert(0, record);
        self.persist()
    }

    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] for an unknown id, or a write error.
    pub fn delete(&mut self, id: &str) -> Result<(), StoreError> {
        let before = self.state.records.len();
        self.state.records.retain(|r| r.id != id);
        if self.state.records.len() == before {
            return Err(StoreError::NotFound(id.to_string()));
        }
        self.persist()
    }

    /// Delete every record whose id is in `ids`; unknown ids are ignored.
    /// Returns how many records were removed.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] when the snapshot cannot be written.
    pub fn delete_many<S: AsRef<str>>(&mut self, ids: &[S]) -> Result<usize, StoreError> {
        let doomed: HashSet<&str> = ids.iter().map(AsRef::as_ref).collect();
        let before = self.state.records.len();
        self.state.records.retain(|r| !doomed.contains(r.id.as_str()));
        let removed = before - self.state.records.len();
        self.persist()?;
        Ok(removed)
    }

    /// # Errors
    ///
    /// Returns a [`StoreError`] when the snapshot cannot be written.
    pub fn clear(&mut self) -> Result<(), StoreError> {
        self.state.records.clear();
        self.persist()
    }

    fn persist(&self) -> Result<(), StoreError> {
        save_snapshot(self.kv.as_ref(), HISTORY_KEY, &self.state)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use chrono::{TimeZone, Utc};
    use hints_core::{HistoryStatus, Platform};

    use super::*;
    use crate::kv::MemoryStore;

    fn record(id: &str, total: u64) -> HistoryRecord {
        HistoryRecord {
            id: id.to_string(),
            task_id: id.to_string(),
            keyword: "演唱会门票".to_string(),
            platforms: vec![Platform::Douyin],
            created_at: Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap(),
            completed_at: None,
            status: HistoryStatus::Completed,
            total_found: total,
            by_platform: BTreeMap::from([("dy".to_string(), total)]),
            results: Vec::new(),
            search_options: None,
        }
    }

    #[test]
    fn add_prepends_and_persists() {
        let kv: Arc<dyn KvStore> = Arc::new(MemoryStore::new());
        let mut log = HistoryLog::load(Arc::clone(&kv));
        log.add(record("t1", 3)).unwrap();
        log.add(record("t2", 5)).unwrap();

        let ids: Vec<&str> = log.records().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["t2", "t1"]);

        let reloaded = HistoryLog::load(kv);
        assert_eq!(reloaded.records(), log.records());
    }

    #[test]
    fn re_adding_a_task_replaces_the_old_record() {
        let mut log = HistoryLog::load(Arc::new(MemoryStore::new()));
        log.add(record("t1", 3)).unwrap();
        log.add(record("t2", 1)).unwrap();
        log.add(record("t1", 9)).unwrap();
        assert_eq!(log.records().len(), 2);
        assert_eq!(log.records()[0].total_found, 9);
    }

    #[test]
    fn delete_and_delete_many() {
        let mut log = HistoryLog::load(Arc::new(MemoryStore::new()));
        for id in ["a", "b", "c", "d"] {
            log.add(record(id, 1)).unwrap();
        }
        log.delete("b").unwrap();
        assert!(matches!(log.delete("b"), Err(StoreError::NotFound(_))));
        assert_eq!(log.delete_many(&["a", "d", "zzz"]).unwrap(), 2);
        assert_eq!(log.records().len(), 1);
        assert!(log.get("c").is_some());

        log.clear().unwrap();
        assert!(log.records().is_empty());
    }

    #[test]
    fn corrupt_snapshot_starts_empty() {
        let kv = Arc::new(MemoryStore::new());
        kv.set(HISTORY_KEY, "][").unwrap();
        assert!(HistoryLog::load(kv).records().is_empty());
    }
}
