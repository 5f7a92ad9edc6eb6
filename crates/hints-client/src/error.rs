use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("rate limited by backend (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    /// Non-2xx response. `detail` carries the backend's error message when
    /// the body had one.
    #[error("unexpected HTTP status {status} from {url}: {detail}")]
    UnexpectedStatus {
        status: u16,
        url: String,
        detail: String,
    },

    /// Rejected before any request was sent.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("invalid base URL \"{base_url}\": {reason}")]
    InvalidBaseUrl { base_url: String, reason: String },

    /// Handshake or transport failure on the log stream socket.
    #[error("log stream error: {0}")]
    LogStream(#[from] Box<tokio_tungstenite::tungstenite::Error>),
}

impl ClientError {
    /// Message suitable for showing to a user: the backend's `detail` for
    /// status errors, the display form otherwise.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            ClientError::UnexpectedStatus { detail, .. } => detail.clone(),
            other => other.to_string(),
        }
    }
}
