use thiserror::Error;

/// Errors returned by the local persistence layer.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing the backing file failed.
    #[error("I/O error for {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// A snapshot could not be encoded or decoded.
    #[error("JSON error for {context}: {source}")]
    Json {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// The storage key cannot be used as a file name.
    #[error("invalid storage key '{0}'")]
    InvalidKey(String),

    /// No record with this id exists in the log.
    #[error("record not found: {0}")]
    NotFound(String),

    /// A backend lock was poisoned by a panicking writer.
    #[error("storage backend lock poisoned")]
    Poisoned,
}
