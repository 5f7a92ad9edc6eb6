//! Local persistence for getsomehints: the live results store and the
//! append-only History and LLM Analysis logs.
//!
//! Every store owns its state and writes a full JSON snapshot through an
//! injected [`KvStore`] on each mutation. Snapshots that fail to load are
//! logged and replaced with empty state.

pub mod analysis;
pub mod error;
pub mod history;
pub mod kv;
pub mod results;

pub use analysis::{AnalysisLog, ANALYSIS_KEY};
pub use error::StoreError;
pub use history::{HistoryLog, HISTORY_KEY};
pub use kv::{FileStore, KvStore, MemoryStore};
pub use results::{ResultsSnapshot, ResultsStore, RESULTS_KEY};
