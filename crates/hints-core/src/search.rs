//! Wire types for the search control boundary.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::platform::Platform;
use crate::post::ContentType;

/// Body of `POST /api/search/start`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub keywords: String,
    pub platforms: Vec<Platform>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_comments: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_sub_comments: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_type: Option<String>,
    /// `all`, `1day`, `1week`, `1month`, `3months` or `6months`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_range: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_types: Option<Vec<ContentType>>,
}

impl SearchRequest {
    /// A request with the defaults the UI used: 50 posts, comments on, all content types.
    #[must_use]
    pub fn new(keywords: impl Into<String>, platforms: Vec<Platform>) -> Self {
        Self {
            keywords: keywords.into(),
            platforms,
            max_count: Some(50),
            enable_comments: Some(true),
            enable_sub_comments: Some(false),
            sort_type: None,
            time_range: Some("all".to_string()),
            content_types: Some(ContentType::ALL.to_vec()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Stopped,
}

impl TaskStatus {
    /// `completed`, `failed` and `stopped` end polling.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            TaskStatus::Completed | TaskStatus::Failed | TaskStatus::Stopped
        )
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Running => "running",
            TaskStatus::Completed => "completed",
            TaskStatus::Failed => "failed",
            TaskStatus::Stopped => "stopped",
        };
        f.write_str(s)
    }
}

/// Status payload returned by start and status polls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub task_id: String,
    pub status: TaskStatus,
    #[serde(default)]
    pub total_found: u64,
    #[serde(default)]
    pub by_platform: BTreeMap<String, u64>,
    #[serde(default)]
    pub progress: Option<u8>,
    #[serde(default)]
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_statuses() {
        assert!(TaskStatus::Completed.is_terminal());
        assert!(TaskStatus::Failed.is_terminal());
        assert!(TaskStatus::Stopped.is_terminal());
        assert!(!TaskStatus::Running.is_terminal());
        assert!(!TaskStatus::Pending.is_terminal());
    }

    #[test]
    fn request_serializes_platform_codes_and_skips_unset_options() {
        let mut request = SearchRequest::new("cat", vec![Platform::Douyin, Platform::Xhs]);
        request.sort_type = None;
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["keywords"], "cat");
        assert_eq!(value["platforms"], serde_json::json!(["dy", "xhs"]));
        assert_eq!(value["max_count"], 50);
        assert_eq!(
            value["content_types"],
            serde_json::json!(["video", "image_text", "link"])
        );
        assert!(value.get("sort_type").is_none());
    }

    #[test]
    fn response_parses_minimal_body() {
        let response: SearchResponse =
            serde_json::from_str(r#"{"task_id":"t1","status":"running"}"#).unwrap();
        assert_eq!(response.status, TaskStatus::Running);
        assert_eq!(response.total_found, 0);
        assert!(response.by_platform.is_empty());
        assert!(response.progress.is_none());
    }
}
