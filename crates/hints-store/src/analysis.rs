//! Newest-first log of finished LLM lead analyses.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use hints_core::{AnalysisDraft, AnalysisRecord};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::kv::{load_snapshot, save_snapshot, KvStore};

pub const ANALYSIS_KEY: &str = "getsomehints-llm-analysis";

const ID_SUFFIX_LEN: usize = 7;
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

#[derive(Debug, Default, Serialize, Deserialize)]
struct AnalysisState {
    #[serde(default)]
    records: Vec<AnalysisRecord>,
}

pub struct AnalysisLog {
    kv: Arc<dyn KvStore>,
    state: AnalysisState,
}

impl AnalysisLog {
    #[must_use]
    pub fn load(kv: Arc<dyn KvStore>) -> Self {
        let state: AnalysisState = load_snapshot(kv.as_ref(), ANALYSIS_KEY);
        tracing::debug!(records = state.records.len(), "llm analysis log loaded");
        Self { kv, state }
    }

    #[must_use]
    pub fn records(&self) -> &[AnalysisRecord] {
        &self.state.records
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&AnalysisRecord> {
        self.state.records.iter().find(|r| r.id == id)
    }

    /// Stamp `draft` with a fresh id and the current time and prepend it.
    /// Returns the new id.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] when the snapshot cannot be written.
    pub fn add(&mut self, draft: AnalysisDraft) -> Result<String, StoreError> {
        let now = Utc::now();
        let id = generate_id(now, &mut rand::rng());
        self.state.records.insert(
            0,
            AnalysisRecord {
                id: id.clone(),
                created_at: now,
                draft,
            },
        );
        tracing::info!(%id, "llm analysis recorded");
        self.persist()?;
        Ok(id)
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
        save_snapshot(self.kv.as_ref(), ANALYSIS_KEY, &self.state)
    }
}

/// `llm-<unix millis>-<7 random base36 chars>`.
fn generate_id(now: DateTime<Utc>, rng: &mut impl Rng) -> String {
    let suffix: String = (0..ID_SUFFIX_LEN)
        .map(|_| char::from(BASE36[rng.random_range(0..BASE36.len())]))
        .collect();
    format!("llm-{}-{suffix}", now.timestamp_millis())
}
