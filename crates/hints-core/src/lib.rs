pub mod app_config;
pub mod config;
pub mod error;
pub mod leads;
pub mod platform;
pub mod post;
pub mod records;
pub mod search;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use error::ConfigError;
pub use leads::{ContactSummary, LeadsResult, LlmScenario, PotentialBuyer, PotentialSeller};
pub use platform::Platform;
pub use post::{Author, Comment, ContentType, Post, TimeValue};
pub use records::{AnalysisDraft, AnalysisRecord, HistoryRecord, HistoryStatus, SearchOptions};
pub use search::{SearchRequest, SearchResponse, TaskStatus};
