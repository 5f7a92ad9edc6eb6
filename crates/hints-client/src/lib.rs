//! Async client for the getsomehints search backend.
//!
//! [`HintsClient`] wraps the HTTP surface, [`SearchSession`] drives a search
//! task to completion against the local stores, and [`AnalyticsSource`]
//! decides whether a report is computed locally or fetched remotely.
//! [`follow_log_stream`] tails the backend log socket.

pub mod analytics;
pub mod client;
pub mod error;
pub mod log_stream;
pub(crate) mod retry;
pub mod session;
pub mod types;

pub use analytics::{remote_report, AnalyticsSource};
pub use client::HintsClient;
pub use error::ClientError;
pub use log_stream::{follow_log_stream, StreamEnd};
pub use session::{SearchSession, SessionOutcome, DEFAULT_POLL_INTERVAL};
pub use types::{LeadsRequest, RemoteStats, DEFAULT_LLM_MODEL};
