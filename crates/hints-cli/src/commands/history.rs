use clap::Subcommand;

use super::detail::show_post;
use super::results::print_posts;
use super::{history_record, Context};

#[derive(Debug, Subcommand)]
pub enum HistoryCommands {
    /// List saved searches, newest first
    List,
    /// Show one saved search with its posts
    Show {
        id: String,
        /// Maximum posts to print
        #[arg(long, default_value = "20")]
        limit: usize,
        /// Show one post of the record (`<platform>-<post_id>`) with its comments
        #[arg(long)]
        post: Option<String>,
    },
    /// Delete saved searches by id
    Delete {
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Delete every saved search
    Clear,
}

/// # Errors
///
/// Returns an error for an unknown id or when the log cannot be saved.
pub(crate) async fn run_history(ctx: &Context, command: HistoryCommands) -> anyhow::Result<()> {
    let mut history = ctx.history();
    match command {
        HistoryCommands::List => {
            if history.records().is_empty() {
                println!("no history yet");
                return Ok(());
            }
            println!(
                "{:<38}{:<11}{:>7}  {:<18}KEYWORD",
                "ID", "STATUS", "FOUND", "CREATED"
            );
            for record in history.records() {
                println!(
                    "{:<38}{:<11}{:>7}  {:<18}{}",
                    record.id,
                    record.status,
                    record.total_found,
                    record.created_at.format("%Y-%m-%d %H:%M"),
                    record.keyword
                );
            }
        }
        HistoryCommands::Show { id, limit, post } => {
            let record = history_record(&history, &id)?;
            if let Some(key) = post {
                return show_post(ctx, &record.results, &key, Some(&record.task_id)).await;
            }
            let platforms: Vec<&str> = record.platforms.iter().map(|p| p.code()).collect();
            println!("id:        {}", record.id);
            println!("keyword:   {}", record.keyword);
            println!("platforms: {}", platforms.join(", "));
            println!("status:    {}", record.status);
            println!("found:     {}", record.total_found);
            println!("created:   {}", record.created_at.to_rfc3339());
            if let Some(done) = record.completed_at {
                println!("completed: {}", done.to_rfc3339());
            }
            print_posts(record.results.iter().take(limit), |_| false);
        }
        HistoryCommands::Delete { ids } => {
            let removed = history.delete_many(&ids)?;
            println!("deleted {removed} of {} records", ids.len());
        }
        HistoryCommands::Clear => {
            history.clear()?;
            println!("history cleared");
        }
    }
    Ok(())
}
