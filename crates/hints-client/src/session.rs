//! Drives one search task from start to a terminal state.
//!
//! [`SearchSession::run`] starts the task, then on every tick fetches status
//! and results together, merging changed batches into the [`ResultsStore`].
//! A terminal status, or a `true` on the stop signal, ends the loop; either
//! way a [`HistoryRecord`] is written when anything was found.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use hints_core::{
    HistoryRecord, HistoryStatus, SearchOptions, SearchRequest, SearchResponse, TaskStatus,
};
use hints_store::{HistoryLog, ResultsStore};
use serde_json::Value;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

use crate::client::HintsClient;
use crate::error::ClientError;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1_000);

/// How a session ended.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionOutcome {
    pub task_id: String,
    pub status: TaskStatus,
    pub total_found: u64,
    pub by_platform: BTreeMap<String, u64>,
    /// Backend message when the task failed.
    pub message: Option<String>,
    pub history_recorded: bool,
}

pub struct SearchSession<'a> {
    client: &'a HintsClient,
    results: &'a mut ResultsStore,
    history: &'a mut HistoryLog,
    poll_interval: Duration,
}

/// Per-run bookkeeping for the polling loop.
struct RunState<'r> {
    request: &'r SearchRequest,
    task_id: String,
    created_at: DateTime<Utc>,
    last_status: SearchResponse,
    last_count: usize,
}

impl<'a> SearchSession<'a> {
    #[must_use]
    pub fn new(
        client: &'a HintsClient,
        results: &'a mut ResultsStore,
        history: &'a mut HistoryLog,
    ) -> Self {
        Self {
            client,
            results,
            history,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    #[must_use]
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Run a search until it reaches a terminal status or `stop` turns `true`.
    ///
    /// Live results are cleared before the task starts. Poll failures are
    /// logged and the loop keeps going; persistence failures are logged and
    /// never end the session.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidRequest`] for a blank keyword or no
    /// platforms, or the error from the start call. Once the task has
    /// started, the session always returns an outcome.
    pub async fn run(
        &mut self,
        request: &SearchRequest,
        mut stop: watch::Receiver<bool>,
    ) -> Result<SessionOutcome, ClientError> {
        validate(request)?;

        if let Err(e) = self.results.clear() {
            tracing::warn!(error = %e, "failed to clear previous results");
        }

        let started = self.client.start_search(request).await?;
        let mut run = RunState {
            request,
            task_id: started.task_id.clone(),
            created_at: Utc::now(),
            last_status: started,
            last_count: 0,
        };

        let mut ticker = tokio::time::interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut stop_open = true;

        if *stop.borrow_and_update() {
            return Ok(self.finish_stopped(run).await);
        }

        loop {
            tokio::select! {
                biased;
                changed = stop.changed(), if stop_open => match changed {
                    Ok(()) if *stop.borrow_and_update() => {
                        return Ok(self.finish_stopped(run).await);
                    }
                    Ok(()) => {}
                    // Sender gone: nobody can stop us any more.
                    Err(_) => stop_open = false,
                },
                _ = ticker.tick() => {
                    self.poll_once(&mut run).await;
                    if run.last_status.status.is_terminal() {
                        return Ok(self.finish_terminal(run).await);
                    }
                }
            }
        }
    }

    async fn poll_once(&mut self, run: &mut RunState<'_>) {
        let (status, payload) = tokio::join!(
            self.client.search_status(&run.task_id),
            self.client.search_results_payload(&run.task_id, None),
        );

        let payload = payload.unwrap_or_else(|e| {
            tracing::debug!(task_id = %run.task_id, error = %e, "results poll failed");
            Value::Array(Vec::new())
        });
        if let Value::Array(items) = &payload {
            if !items.is_empty() && items.len() != run.last_count {
                run.last_count = items.len();
                self.merge(&payload);
            }
        }

        match status {
            Ok(status) => {
                tracing::debug!(
                    task_id = %run.task_id,
                    status = %status.status,
                    total_found = status.total_found,
                    progress = status.progress.unwrap_or_default(),
                    "poll"
                );
                run.last_status = status;
            }
            Err(e) => {
                tracing::warn!(
                    task_id = %run.task_id,
                    error = %e,
                    "status poll failed; continuing"
                );
            }
        }
    }

    /// The backend reported `completed`, `failed` or `stopped` on its own.
    async fn finish_terminal(&mut self, run: RunState<'_>) -> SessionOutcome {
        let message = (run.last_status.status == TaskStatus::Failed).then(|| {
            let message = if run.last_status.message.is_empty() {
                "search failed".to_string()
            } else {
                run.last_status.message.clone()
            };
            tracing::warn!(task_id = %run.task_id, %message, "search failed");
            message
        });

        match self.client.search_results_payload(&run.task_id, None).await {
            Ok(payload) => self.merge(&payload),
            Err(e) => {
                tracing::warn!(task_id = %run.task_id, error = %e, "final results fetch failed");
            }
        }

        let status = run.last_status.status;
        let history_recorded = HistoryStatus::from_task(status)
            .is_some_and(|history_status| self.record_history(&run, history_status));
        tracing::info!(
            task_id = %run.task_id,
            %status,
            total_found = run.last_status.total_found,
            "search finished"
        );

        SessionOutcome {
            task_id: run.task_id,
            status,
            total_found: run.last_status.total_found,
            by_platform: run.last_status.by_platform,
            message,
            history_recorded,
        }
    }

    /// Stop requested locally. Every step after halting the loop is best
    /// effort and the outcome is always `stopped`.
    async fn finish_stopped(&mut self, mut run: RunState<'_>) -> SessionOutcome {
        if let Err(e) = self.client.stop_search(&run.task_id).await {
            tracing::warn!(task_id = %run.task_id, error = %e, "stop request failed");
        }

        match self.client.search_status(&run.task_id).await {
            Ok(status) => run.last_status = status,
            Err(e) => {
                tracing::warn!(
                    task_id = %run.task_id,
                    error = %e,
                    "status after stop unavailable; using last known totals"
                );
            }
        }

        match self.client.search_results_payload(&run.task_id, None).await {
            Ok(payload) => self.merge(&payload),
            Err(e) => {
                tracing::warn!(
                    task_id = %run.task_id,
                    error = %e,
                    "results after stop unavailable; keeping last fetched results"
                );
            }
        }

        run.last_status.status = TaskStatus::Stopped;
        let history_recorded = self.record_history(&run, HistoryStatus::Stopped);
        tracing::info!(
            task_id = %run.task_id,
            total_found = run.last_status.total_found,
            "search stopped"
        );

        SessionOutcome {
            task_id: run.task_id,
            status: TaskStatus::Stopped,
            total_found: run.last_status.total_found,
            by_platform: run.last_status.by_platform,
            message: None,
            history_recorded,
        }
    }

    fn merge(&mut self, payload: &Value) {
        if let Err(e) = self.results.set_results_json(payload) {
            tracing::warn!(error = %e, "failed to persist merged results");
        }
    }

    /// Adds a history record when the task found anything. Returns whether
    /// a record was written.
    fn record_history(&mut self, run: &RunState<'_>, status: HistoryStatus) -> bool {
        if run.last_status.total_found == 0 {
            return false;
        }
        let record = HistoryRecord {
            id: run.task_id.clone(),
            task_id: run.task_id.clone(),
            keyword: run.request.keywords.clone(),
            platforms: run.request.platforms.clone(),
            created_at: run.created_at,
            completed_at: Some(Utc::now()),
            status,
            total_found: run.last_status.total_found,
            by_platform: run.last_status.by_platform.clone(),
            results: self.results.results().to_vec(),
            search_options: Some(SearchOptions::from(run.request)),
        };
        match self.history.add(record) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(
                    task_id = %run.task_id,
                    error = %e,
                    "failed to save history record"
                );
                false
            }
        }
    }
}

fn validate(request: &SearchRequest) -> Result<(), ClientError> {
    if request.keywords.trim().is_empty() {
        return Err(ClientError::InvalidRequest(
            "keyword must not be blank".to_string(),
        ));
    }
    if request.platforms.is_empty() {
        return Err(ClientError::InvalidRequest(
            "select at least one platform".to_string(),
        ));
    }
    Ok(())
}
