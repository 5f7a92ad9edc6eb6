//! Command handlers. Each submodule owns its clap argument types and the
//! `run_*` functions `main` dispatches to.

pub(crate) mod analyze;
pub(crate) mod detail;
pub(crate) mod export;
pub(crate) mod history;
pub(crate) mod llm;
pub(crate) mod logs;
pub(crate) mod results;
pub(crate) mod search;
pub(crate) mod select;

use std::sync::Arc;

use anyhow::Context as _;
use hints_client::HintsClient;
use hints_core::{AppConfig, HistoryRecord};
use hints_store::{AnalysisLog, FileStore, HistoryLog, KvStore, ResultsStore};

pub(crate) use export::ExportArgs;
pub(crate) use history::HistoryCommands;
pub(crate) use llm::LlmCommands;
pub(crate) use results::{ResultsArgs, ResultsCommands};
pub(crate) use search::SearchArgs;
pub(crate) use select::SelectCommands;

/// Loaded configuration plus the persistence backend every command shares.
pub(crate) struct Context {
    pub(crate) config: AppConfig,
    kv: Arc<dyn KvStore>,
}

impl Context {
    /// # Errors
    ///
    /// Returns an error if the data directory cannot be created.
    pub(crate) fn open(config: AppConfig) -> anyhow::Result<Self> {
        let store = FileStore::open(&config.data_dir).with_context(|| {
            format!("opening data directory {}", config.data_dir.display())
        })?;
        tracing::debug!(data_dir = %store.dir().display(), env = %config.env, "data store opened");
        Ok(Self {
            config,
            kv: Arc::new(store),
        })
    }

    pub(crate) fn results(&self) -> ResultsStore {
        ResultsStore::load(Arc::clone(&self.kv))
    }

    pub(crate) fn history(&self) -> HistoryLog {
        HistoryLog::load(Arc::clone(&self.kv))
    }

    pub(crate) fn analyses(&self) -> AnalysisLog {
        AnalysisLog::load(Arc::clone(&self.kv))
    }

    /// # Errors
    ///
    /// Returns an error if the configured base URL is invalid.
    pub(crate) fn client(&self) -> anyhow::Result<HintsClient> {
        Ok(HintsClient::new(&self.config)?)
    }
}

/// Look up a history record or fail with a message naming the id.
pub(crate) fn history_record(history: &HistoryLog, id: &str) -> anyhow::Result<HistoryRecord> {
    history
        .get(id)
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("history record '{id}' not found"))
}
