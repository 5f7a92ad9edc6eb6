//! HTTP client for the getsomehints search backend.
//!
//! Covers the search control endpoints (start, status, results, stop,
//! comments), the analytics endpoints and the LLM lead analysis endpoints.
//! Reads are retried on transient failures; starting a task and running an
//! LLM analysis are sent once. Non-2xx responses surface the backend's
//! `detail` message in [`ClientError::UnexpectedStatus`].

use std::collections::BTreeMap;
use std::time::Duration;

use hints_core::{
    AppConfig, Comment, LeadsResult, LlmScenario, Platform, Post, SearchRequest, SearchResponse,
};
use hints_engine::analytics::AuthorRank;
use reqwest::{Client, Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ClientError;
use crate::retry::retry_with_backoff;
use crate::types::{LeadsRequest, RemoteStats};

const USER_AGENT: &str = "getsomehints/0.1 (hints-client)";
const DEFAULT_MAX_RETRIES: u32 = 3;
const DEFAULT_BACKOFF_BASE_MS: u64 = 500;
const MAX_DETAIL_CHARS: usize = 200;

/// Client for the search backend.
///
/// Use [`HintsClient::new`] with loaded configuration, or
/// [`HintsClient::with_base_url`] to point at a mock server in tests.
pub struct HintsClient {
    client: Client,
    base_url: Url,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl HintsClient {
    /// Builds a client from application configuration (base URL, timeout and
    /// retry policy).
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Http`] if the `reqwest::Client` cannot be built,
    /// or [`ClientError::InvalidBaseUrl`] for a malformed base URL.
    pub fn new(config: &AppConfig) -> Result<Self, ClientError> {
        Ok(
            Self::with_base_url(&config.api_base_url, config.request_timeout_secs)?
                .with_retry(config.max_retries, config.retry_backoff_base_ms),
        )
    }

    /// # Errors
    ///
    /// Returns [`ClientError::Http`] if the `reqwest::Client` cannot be built,
    /// or [`ClientError::InvalidBaseUrl`] unless `base_url` is an absolute
    /// `http`/`https` URL.
    pub fn with_base_url(base_url: &str, timeout_secs: u64) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(USER_AGENT)
            .build()?;

        // A trailing slash keeps path_segments_mut appending after any
        // prefix the deployment mounts the API under.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let parsed = Url::parse(&normalised).map_err(|e| ClientError::InvalidBaseUrl {
            base_url: base_url.to_string(),
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ClientError::InvalidBaseUrl {
                base_url: base_url.to_string(),
                reason: format!("unsupported scheme {}", parsed.scheme()),
            });
        }

        Ok(Self {
            client,
            base_url: parsed,
            max_retries: DEFAULT_MAX_RETRIES,
            backoff_base_ms: DEFAULT_BACKOFF_BASE_MS,
        })
    }

    /// Override the retry policy. `max_retries = 0` disables retries.
    #[must_use]
    pub fn with_retry(mut self, max_retries: u32, backoff_base_ms: u64) -> Self {
        self.max_retries = max_retries;
        self.backoff_base_ms = backoff_base_ms;
        self
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Starts a search task. Sent once, never retried.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::UnexpectedStatus`] when the backend rejects the
    /// request (for example no keyword or no platform), or a transport error.
    pub async fn start_search(
        &self,
        request: &SearchRequest,
    ) -> Result<SearchResponse, ClientError> {
        let url = self.endpoint(&["api", "search", "start"], &[]);
        let body = serde_json::to_value(request).map_err(|source| ClientError::Deserialize {
            context: "search request".to_string(),
            source,
        })?;
        let response: SearchResponse =
            decode(self.send_json(Method::POST, &url, Some(&body)).await?, &url)?;
        tracing::info!(
            task_id = %response.task_id,
            keywords = %request.keywords,
            platforms = request.platforms.len(),
            "search started"
        );
        Ok(response)
    }

    /// # Errors
    ///
    /// Returns a [`ClientError`] on transport failure, non-2xx status or a
    /// malformed body.
    pub async fn search_status(&self, task_id: &str) -> Result<SearchResponse, ClientError> {
        let url = self.endpoint(&["api", "search", "status", task_id], &[]);
        decode(self.request_json(Method::GET, &url, None).await?, &url)
    }

    /// Raw results payload for a task, optionally limited to one platform.
    ///
    /// Returned undecoded so callers can hand it to the lenient aggregator,
    /// which ignores payloads that are not arrays.
    ///
    /// # Errors
    ///
    /// Returns a [`ClientError`] on transport failure or non-2xx status.
    pub async fn search_results_payload(
        &self,
        task_id: &str,
        platform: Option<&Platform>,
    ) -> Result<Value, ClientError> {
        let query: Vec<(&str, &str)> = platform
            .map(|p| ("platform", p.code()))
            .into_iter()
            .collect();
        let url = self.endpoint(&["api", "search", "results", task_id], &query);
        self.request_json(Method::GET, &url, None).await
    }

    /// # Errors
    ///
    /// Returns a [`ClientError`] on transport failure, non-2xx status or a
    /// body that is not a list of posts.
    pub async fn search_results(
        &self,
        task_id: &str,
        platform: Option<&Platform>,
    ) -> Result<Vec<Post>, ClientError> {
        let body = self.search_results_payload(task_id, platform).await?;
        serde_json::from_value(body).map_err(|source| ClientError::Deserialize {
            context: format!("results for task {task_id}"),
            source,
        })
    }

    /// Asks the backend to stop a running task.
    ///
    /// # Errors
    ///
    /// Returns a [`ClientError`] on transport failure or non-2xx status.
    pub async fn stop_search(&self, task_id: &str) -> Result<(), ClientError> {
        let url = self.endpoint(&["api", "search", "stop", task_id], &[]);
        self.request_json(Method::POST, &url, None).await?;
        tracing::info!(task_id, "stop requested");
        Ok(())
    }

    /// Comments of one post, optionally scoped to the task that found it.
    ///
    /// # Errors
    ///
    /// Returns a [`ClientError`] on transport failure, non-2xx status or a
    /// malformed body.
    pub async fn post_comments(
        &self,
        platform: &Platform,
        post_id: &str,
        task_id: Option<&str>,
    ) -> Result<Vec<Comment>, ClientError> {
        let query: Vec<(&str, &str)> = task_id.map(|t| ("task_id", t)).into_iter().collect();
        let url = self.endpoint(
            &["api", "search", "comments", platform.code(), post_id],
            &query,
        );
        decode(self.request_json(Method::GET, &url, None).await?, &url)
    }

    /// Comments to show for `post`: the ones embedded in its payload when
    /// there are any, otherwise a fetch from the comments endpoint. A failed
    /// fetch yields an empty list.
    pub async fn comments_for(&self, post: &Post, task_id: Option<&str>) -> Vec<Comment> {
        let embedded = post.embedded_comments();
        if !embedded.is_empty() {
            return embedded;
        }
        match self.post_comments(&post.platform, &post.post_id, task_id).await {
            Ok(comments) => comments,
            Err(e) => {
                tracing::warn!(key = %post.key(), error = %e, "comment fetch failed");
                Vec::new()
            }
        }
    }

    /// # Errors
    ///
    /// Returns a [`ClientError`] on transport failure, non-2xx status or a
    /// malformed body.
    pub async fn analysis_stats(&self, task_id: &str) -> Result<RemoteStats, ClientError> {
        let url = self.endpoint(&["api", "analysis", "stats"], &[("task_id", task_id)]);
        decode(self.request_json(Method::POST, &url, None).await?, &url)
    }

    /// Post count per platform code.
    ///
    /// # Errors
    ///
    /// Returns a [`ClientError`] on transport failure, non-2xx status or a
    /// malformed body.
    pub async fn analysis_distribution(
        &self,
        task_id: &str,
    ) -> Result<BTreeMap<String, usize>, ClientError> {
        let url = self.endpoint(
            &["api", "analysis", "distribution"],
            &[("task_id", task_id)],
        );
        decode(self.request_json(Method::POST, &url, None).await?, &url)
    }

    /// Post count per day.
    ///
    /// # Errors
    ///
    /// Returns a [`ClientError`] on transport failure, non-2xx status or a
    /// malformed body.
    pub async fn analysis_trends(
        &self,
        task_id: &str,
    ) -> Result<BTreeMap<String, usize>, ClientError> {
        let url = self.endpoint(
            &["api", "analysis", "trends"],
            &[("task_id", task_id), ("interval", "day")],
        );
        decode(self.request_json(Method::POST, &url, None).await?, &url)
    }

    /// # Errors
    ///
    /// Returns a [`ClientError`] on transport failure, non-2xx status or a
    /// malformed body.
    pub async fn analysis_top_authors(
        &self,
        task_id: &str,
        limit: usize,
    ) -> Result<Vec<AuthorRank>, ClientError> {
        let limit = limit.to_string();
        let url = self.endpoint(
            &["api", "analysis", "top-authors"],
            &[("task_id", task_id), ("limit", limit.as_str())],
        );
        decode(self.request_json(Method::POST, &url, None).await?, &url)
    }

    /// Runs LLM lead analysis over posts or a task's stored results. Sent
    /// once, never retried.
    ///
    /// # Errors
    ///
    /// Returns a [`ClientError`] on transport failure, non-2xx status (with
    /// the backend's message in `detail`) or a malformed body.
    pub async fn llm_leads(&self, request: &LeadsRequest) -> Result<LeadsResult, ClientError> {
        let url = self.endpoint(&["api", "analysis", "llm-leads"], &[]);
        let body = serde_json::to_value(request).map_err(|source| ClientError::Deserialize {
            context: "llm leads request".to_string(),
            source,
        })?;
        tracing::info!(
            posts = request.posts.len(),
            task_id = request.task_id.as_deref().unwrap_or_default(),
            model = %request.model,
            "llm lead analysis requested"
        );
        decode(self.send_json(Method::POST, &url, Some(&body)).await?, &url)
    }

    /// # Errors
    ///
    /// Returns a [`ClientError`] on transport failure, non-2xx status or a
    /// malformed body.
    pub async fn llm_scenarios(&self) -> Result<Vec<LlmScenario>, ClientError> {
        let url = self.endpoint(&["api", "analysis", "llm-scenarios"], &[]);
        decode(self.request_json(Method::GET, &url, None).await?, &url)
    }

    /// Appends percent-encoded path segments and query pairs to the base URL.
    fn endpoint(&self, segments: &[&str], query: &[(&str, &str)]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query.iter());
        }
        url
    }

    /// Sends a request with retry on transient failures. Only for reads and
    /// other calls the backend can safely receive more than once.
    async fn request_json(
        &self,
        method: Method,
        url: &Url,
        body: Option<&Value>,
    ) -> Result<Value, ClientError> {
        retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            self.send_json(method.clone(), url, body)
        })
        .await
    }

    /// One attempt: sends the request, asserts a 2xx status and parses the
    /// body as JSON. Calls that create work on the backend (starting a task,
    /// running an LLM analysis) go through here directly.
    async fn send_json(
        &self,
        method: Method,
        url: &Url,
        body: Option<&Value>,
    ) -> Result<Value, ClientError> {
        let mut request = self.client.request(method, url.clone());
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(ClientError::RateLimited { retry_after_secs });
        }

        let text = response.text().await?;
        if !status.is_success() {
            return Err(ClientError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
                detail: error_detail(&text, status),
            });
        }

        serde_json::from_str(&text).map_err(|source| ClientError::Deserialize {
            context: url.to_string(),
            source,
        })
    }
}

fn decode<T: DeserializeOwned>(body: Value, url: &Url) -> Result<T, ClientError> {
    serde_json::from_value(body).map_err(|source| ClientError::Deserialize {
        context: url.to_string(),
        source,
    })
}

/// Pulls a readable message out of an error body.
///
/// The backend answers errors with `{"detail": "..."}` or, for validation
/// failures, `{"detail": [{"msg": "..."}, ...]}`. Anything else falls back to
/// the (truncated) body text, then to the status reason.
fn error_detail(body: &str, status: StatusCode) -> String {
    let from_json = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("detail").cloned())
        .and_then(|detail| match detail {
            Value::String(s) => Some(s),
            Value::Array(items) => {
                let msgs: Vec<&str> = items
                    .iter()
                    .filter_map(|i| i.get("msg").and_then(Value::as_str))
                    .collect();
                (!msgs.is_empty()).then(|| msgs.join("; "))
            }
            _ => None,
        });
    if let Some(detail) = from_json {
        return detail;
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        status.canonical_reason().unwrap_or("request failed").to_string()
    } else {
        trimmed.chars().take(MAX_DETAIL_CHARS).collect()
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
