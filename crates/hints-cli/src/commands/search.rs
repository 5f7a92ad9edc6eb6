//! `hints search`: run one search session in the foreground.

use std::time::Duration;

use clap::Args;
use hints_client::SearchSession;
use hints_core::{ContentType, Platform, SearchRequest, TaskStatus};
use tokio::sync::watch;

use super::Context;

#[derive(Debug, Args)]
pub struct SearchArgs {
    /// Keyword to search for
    pub keyword: String,
    /// Platform code to search (repeatable, e.g. `--platform dy --platform xhs`)
    #[arg(long = "platform", required = true)]
    pub platforms: Vec<Platform>,
    /// Maximum posts per platform
    #[arg(long, default_value = "50")]
    pub max_count: u32,
    /// Skip fetching comments
    #[arg(long)]
    pub no_comments: bool,
    /// Also fetch second-level comments
    #[arg(long)]
    pub sub_comments: bool,
    /// `all`, `1day`, `1week`, `1month`, `3months` or `6months`
    #[arg(long, default_value = "all")]
    pub time_range: String,
    /// Content type to include (repeatable; default all)
    #[arg(long = "content-type")]
    pub content_types: Vec<ContentType>,
}

impl SearchArgs {
    pub(crate) fn to_request(&self) -> SearchRequest {
        let mut request = SearchRequest::new(self.keyword.clone(), self.platforms.clone());
        request.max_count = Some(self.max_count);
        request.enable_comments = Some(!self.no_comments);
        request.enable_sub_comments = Some(self.sub_comments);
        request.time_range = Some(self.time_range.clone());
        if !self.content_types.is_empty() {
            request.content_types = Some(self.content_types.clone());
        }
        request
    }
}

/// Start a search and poll it until it ends or Ctrl-C is pressed.
///
/// # Errors
///
/// Returns an error if the request is invalid or the backend refuses to
/// start the task. Failures after the start are reported in the outcome.
pub(crate) async fn run_search(ctx: &Context, args: SearchArgs) -> anyhow::Result<()> {
    let client = ctx.client()?;
    let mut results = ctx.results();
    let mut history = ctx.history();
    let request = args.to_request();

    let (stop_tx, stop_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("stopping...");
            let _ = stop_tx.send(true);
        }
    });

    let outcome = SearchSession::new(&client, &mut results, &mut history)
        .with_poll_interval(Duration::from_millis(ctx.config.poll_interval_ms))
        .run(&request, stop_rx)
        .await?;

    let by_platform = outcome
        .by_platform
        .iter()
        .map(|(code, n)| format!("{code}={n}"))
        .collect::<Vec<_>>()
        .join(" ");
    println!(
        "task {} {}: {} found ({by_platform}), {} held locally",
        outcome.task_id,
        outcome.status,
        outcome.total_found,
        results.results().len()
    );
    if outcome.status == TaskStatus::Failed {
        println!(
            "search failed: {}",
            outcome.message.as_deref().unwrap_or("unknown error")
        );
    }
    if outcome.history_recorded {
        println!("saved to history as {}", outcome.task_id);
    }

    Ok(())
}
