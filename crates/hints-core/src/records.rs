//! Records kept in the local History and LLM Analysis logs.
//!
//! Both serialize with camelCase keys so snapshots stay compatible with the
//! browser client's persisted state.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::leads::LeadsResult;
use crate::platform::Platform;
use crate::post::{ContentType, Post};
use crate::search::{SearchRequest, TaskStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryStatus {
    Completed,
    Stopped,
    Failed,
}

impl HistoryStatus {
    /// Maps a terminal task status; non-terminal statuses have no history form.
    #[must_use]
    pub fn from_task(status: TaskStatus) -> Option<Self> {
        match status {
            TaskStatus::Completed => Some(HistoryStatus::Completed),
            TaskStatus::Stopped => Some(HistoryStatus::Stopped),
            TaskStatus::Failed => Some(HistoryStatus::Failed),
            TaskStatus::Pending | TaskStatus::Running => None,
        }
    }
}

impl std::fmt::Display for HistoryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            HistoryStatus::Completed => "completed",
            HistoryStatus::Stopped => "stopped",
            HistoryStatus::Failed => "failed",
        };
        f.pad(s)
    }
}

/// Search configuration captured alongside a history record.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_comments: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_sub_comments: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_range: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_types: Option<Vec<ContentType>>,
}

impl From<&SearchRequest> for SearchOptions {
    fn from(request: &SearchRequest) -> Self {
        Self {
            max_count: request.max_count,
            enable_comments: request.enable_comments,
            enable_sub_comments: request.enable_sub_comments,
            time_range: request.time_range.clone(),
            content_types: request.content_types.clone(),
        }
    }
}

/// A completed (or stopped/failed) search run with its full result list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRecord {
    /// Same as `task_id`.
    pub id: String,
    pub task_id: String,
    pub keyword: String,
    pub platforms: Vec<Platform>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    pub status: HistoryStatus,
    pub total_found: u64,
    #[serde(default)]
    pub by_platform: BTreeMap<String, u64>,
    #[serde(default)]
    pub results: Vec<Post>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_options: Option<SearchOptions>,
}

/// An LLM analysis before the log assigns it an id and timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisDraft {
    pub name: String,
    pub model: String,
    pub posts_count: usize,
    pub result: LeadsResult,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scene: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scene_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seller_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buyer_label: Option<String>,
}

/// A stored LLM lead analysis. Id format: `llm-<unix millis>-<random>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRecord {
    pub id: String,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub draft: AnalysisDraft,
}

impl AnalysisRecord {
    #[must_use]
    pub fn seller_label(&self) -> &str {
        self.draft.seller_label.as_deref().unwrap_or("潜在卖家")
    }

    #[must_use]
    pub fn buyer_label(&self) -> &str {
        self.draft.buyer_label.as_deref().unwrap_or("潜在买家")
    }

    /// Scenario shown in exports: the scenario name, else its id, else empty.
    #[must_use]
    pub fn scenario(&self) -> &str {
        self.draft
            .scene_name
            .as_deref()
            .or(self.draft.scene.as_deref())
            .unwrap_or("")
    }
}
