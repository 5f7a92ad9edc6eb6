//! Request and response shapes specific to the backend's HTTP surface.

use std::collections::BTreeMap;

use hints_core::Post;
use hints_engine::analytics::{PlatformStats, TimeRange};
use serde::{Deserialize, Serialize};

/// Model used for lead analysis when the caller does not pick one.
pub const DEFAULT_LLM_MODEL: &str = "deepseek-chat";

/// Body of `POST /api/analysis/llm-leads`.
///
/// The backend analyses `posts` when given, otherwise the stored results of
/// `task_id`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeadsRequest {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub posts: Vec<Post>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scene: Option<String>,
}

impl LeadsRequest {
    #[must_use]
    pub fn for_posts(posts: Vec<Post>) -> Self {
        Self {
            posts,
            task_id: None,
            model: DEFAULT_LLM_MODEL.to_string(),
            scene: None,
        }
    }

    #[must_use]
    pub fn for_task(task_id: impl Into<String>) -> Self {
        Self {
            posts: Vec::new(),
            task_id: Some(task_id.into()),
            model: DEFAULT_LLM_MODEL.to_string(),
            scene: None,
        }
    }

    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    #[must_use]
    pub fn with_scene(mut self, scene: Option<String>) -> Self {
        self.scene = scene;
        self
    }
}

/// Response of `POST /api/analysis/stats`. Histogram and content-type fields
/// are optional; older backends omit them.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct RemoteStats {
    #[serde(default)]
    pub total_posts: usize,
    #[serde(default)]
    pub total_comments: u64,
    #[serde(default)]
    pub total_authors: usize,
    #[serde(default)]
    pub platform_stats: Vec<PlatformStats>,
    #[serde(default)]
    pub time_range: TimeRange,
    #[serde(default)]
    pub content_type_distribution: Option<BTreeMap<String, usize>>,
    #[serde(default)]
    pub like_buckets: Option<BTreeMap<String, usize>>,
    #[serde(default)]
    pub comment_buckets: Option<BTreeMap<String, usize>>,
}
