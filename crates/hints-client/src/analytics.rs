//! Analytics for a task, computed locally or fetched from the backend.

use std::collections::BTreeMap;

use hints_core::{ContentType, Post};
use hints_engine::analytics::{empty_buckets, AuthorRank, Bucket};
use hints_engine::AnalysisReport;

use crate::client::HintsClient;
use crate::error::ClientError;
use crate::types::RemoteStats;

/// Number of authors requested from the top-authors endpoint.
const REMOTE_TOP_AUTHORS: usize = 10;

/// Where a report's numbers come from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AnalyticsSource<'a> {
    /// Computed from posts already held locally.
    Live(&'a [Post]),
    /// Fetched from the backend's analysis endpoints for a task.
    Remote(&'a str),
    /// Nothing to analyse.
    Empty,
}

impl<'a> AnalyticsSource<'a> {
    /// Live when any local posts exist, otherwise remote when a task id is
    /// known.
    #[must_use]
    pub fn choose(local: &'a [Post], task_id: Option<&'a str>) -> Self {
        if !local.is_empty() {
            AnalyticsSource::Live(local)
        } else if let Some(task_id) = task_id.filter(|t| !t.is_empty()) {
            AnalyticsSource::Remote(task_id)
        } else {
            AnalyticsSource::Empty
        }
    }

    /// # Errors
    ///
    /// Returns a [`ClientError`] when a remote endpoint fails.
    pub async fn report(self, client: &HintsClient) -> Result<AnalysisReport, ClientError> {
        match self {
            AnalyticsSource::Live(posts) => Ok(AnalysisReport::from_posts(posts)),
            AnalyticsSource::Remote(task_id) => remote_report(client, task_id).await,
            AnalyticsSource::Empty => Ok(AnalysisReport::from_posts(&[])),
        }
    }
}

/// Fetch stats, distribution, trends and top authors concurrently and
/// assemble them into a report.
///
/// Sections the backend does not compute (top posts, comment rankings) are
/// left empty; missing histograms keep every label with a zero count.
///
/// # Errors
///
/// Returns the first [`ClientError`] among the four requests.
pub async fn remote_report(
    client: &HintsClient,
    task_id: &str,
) -> Result<AnalysisReport, ClientError> {
    let (stats, distribution, trend, top_authors) = tokio::try_join!(
        client.analysis_stats(task_id),
        client.analysis_distribution(task_id),
        client.analysis_trends(task_id),
        client.analysis_top_authors(task_id, REMOTE_TOP_AUTHORS),
    )?;
    tracing::debug!(
        task_id,
        total_posts = stats.total_posts,
        platforms = distribution.len(),
        "remote analytics fetched"
    );
    Ok(assemble(stats, distribution, trend, top_authors))
}

fn assemble(
    stats: RemoteStats,
    platform_distribution: BTreeMap<String, usize>,
    trend: BTreeMap<String, usize>,
    top_authors: Vec<AuthorRank>,
) -> AnalysisReport {
    let (like_defaults, comment_defaults) = empty_buckets();

    let mut content_type_distribution: BTreeMap<String, usize> = ContentType::ALL
        .iter()
        .map(|t| (t.as_str().to_string(), 0))
        .collect();
    if let Some(remote) = stats.content_type_distribution {
        content_type_distribution.extend(remote);
    }

    AnalysisReport {
        total_posts: stats.total_posts,
        total_comments: stats.total_comments,
        total_authors: stats.total_authors,
        platform_stats: stats.platform_stats,
        time_range: stats.time_range,
        content_type_distribution,
        like_buckets: fill_buckets(like_defaults, stats.like_buckets.as_ref()),
        comment_buckets: fill_buckets(comment_defaults, stats.comment_buckets.as_ref()),
        platform_distribution,
        trend,
        top_authors,
        ..AnalysisReport::default()
    }
}

/// Copies counts from a label-keyed map into the ordered bucket list.
/// Labels this side does not know are dropped.
fn fill_buckets(
    mut buckets: Vec<Bucket>,
    remote: Option<&BTreeMap<String, usize>>,
) -> Vec<Bucket> {
    if let Some(remote) = remote {
        for bucket in &mut buckets {
            if let Some(count) = remote.get(&bucket.range) {
                bucket.count = *count;
            }
        }
    }
    buckets
}
