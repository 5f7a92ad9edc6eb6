//! Result aggregation and analytics engine.
//!
//! Pure, synchronous functions over owned post lists: merging incoming batches
//! into a de-duplicated result set, filtering and sorting a display view,
//! deriving analytics summaries, tracking a selection, formatting exports and
//! buffering log stream entries. Nothing here performs I/O.

pub mod aggregate;
pub mod analytics;
pub mod error;
pub mod export;
pub mod logs;
pub mod selection;
mod text;
pub mod timestamp;
pub mod view;

pub use aggregate::{merge, merge_json, MergeOutcome};
pub use analytics::AnalysisReport;
pub use error::ExportError;
pub use logs::{LogBuffer, LogEntry, LogLevel, ReconnectPolicy};
pub use selection::SelectionSet;
pub use text::ellipsize;
pub use timestamp::publish_time_ms;
pub use view::{view, Filters, SortBy};
