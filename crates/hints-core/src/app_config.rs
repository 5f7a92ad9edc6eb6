use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: Environment,
    /// Base URL of the search backend, e.g. `http://127.0.0.1:8000`.
    pub api_base_url: String,
    /// Base URL of the log stream; derived from `api_base_url` when unset.
    pub ws_base_url: String,
    /// Directory holding the persisted result, history and analysis snapshots.
    pub data_dir: PathBuf,
    pub log_level: String,
    pub request_timeout_secs: u64,
    pub poll_interval_ms: u64,
    pub max_retries: u32,
    pub retry_backoff_base_ms: u64,
    /// Number of log stream lines kept in memory.
    pub log_max_lines: usize,
}

impl AppConfig {
    /// Full URL of the backend log stream endpoint.
    #[must_use]
    pub fn log_stream_url(&self) -> String {
        format!("{}/api/ws/logs", self.ws_base_url.trim_end_matches('/'))
    }
}

/// Derive a websocket base URL from an HTTP base URL (`http` → `ws`, `https` → `wss`).
#[must_use]
pub fn derive_ws_base_url(api_base_url: &str) -> String {
    if let Some(rest) = strip_prefix_ignore_case(api_base_url, "https://") {
        format!("wss://{rest}")
    } else if let Some(rest) = strip_prefix_ignore_case(api_base_url, "http://") {
        format!("ws://{rest}")
    } else {
        api_base_url.to_string()
    }
}

fn strip_prefix_ignore_case<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    s.get(..prefix.len())
        .filter(|head| head.eq_ignore_ascii_case(prefix))
        .map(|_| &s[prefix.len()..])
}
