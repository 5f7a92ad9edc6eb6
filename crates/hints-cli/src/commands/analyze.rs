use hints_client::AnalyticsSource;

use super::{history_record, Context};

/// Print the analytics report for a history record, the live results, or a
/// backend task, in that order of preference.
///
/// # Errors
///
/// Returns an error for an unknown history id or when the remote analysis
/// endpoints fail.
pub(crate) async fn run_analyze(
    ctx: &Context,
    history_id: Option<&str>,
    task_id: Option<&str>,
) -> anyhow::Result<()> {
    let posts = match history_id {
        Some(id) => history_record(&ctx.history(), id)?.results,
        None => ctx.results().results().to_vec(),
    };

    let source = AnalyticsSource::choose(&posts, task_id);
    match source {
        AnalyticsSource::Live(posts) => tracing::info!(posts = posts.len(), "analysing locally"),
        AnalyticsSource::Remote(task) => tracing::info!(task, "fetching remote analytics"),
        AnalyticsSource::Empty => {
            println!("nothing to analyse; run a search or pass --task");
            return Ok(());
        }
    }

    let client = ctx.client()?;
    let report = source.report(&client).await?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
