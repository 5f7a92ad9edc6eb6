use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    /// Nothing to export; callers show a notice and write nothing.
    #[error("nothing to export")]
    Empty,

    #[error("JSON serialization error for {context}: {source}")]
    Serialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}
