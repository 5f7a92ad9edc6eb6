//! Filtering and sorting of the live result set into a display view.

use std::cmp::Reverse;

use hints_core::{Platform, Post};
use serde::{Deserialize, Serialize};

use crate::timestamp::publish_time_ms;

/// Active display filters. An empty platform list means "all platforms".
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Filters {
    #[serde(default)]
    pub platforms: Vec<Platform>,
    #[serde(default)]
    pub keyword: String,
}

impl Filters {
    #[must_use]
    pub fn new(platforms: Vec<Platform>, keyword: impl Into<String>) -> Self {
        Self {
            platforms,
            keyword: keyword.into(),
        }
    }

    fn admits_platform(&self, platform: &Platform) -> bool {
        self.platforms.is_empty() || self.platforms.contains(platform)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    /// Newest first by normalized publish time.
    #[default]
    Time,
    /// Most liked first.
    Hot,
    /// Most commented first.
    Comments,
}

impl SortBy {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SortBy::Time => "time",
            SortBy::Hot => "hot",
            SortBy::Comments => "comments",
        }
    }
}

impl std::fmt::Display for SortBy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SortBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "time" => Ok(SortBy::Time),
            "hot" => Ok(SortBy::Hot),
            "comments" => Ok(SortBy::Comments),
            other => Err(format!("unknown sort key '{other}' (expected time, hot or comments)")),
        }
    }
}

/// Filter `results` by platform, then by keyword, then sort.
///
/// The keyword is trimmed; a blank keyword applies no restriction, otherwise
/// it must appear (case-insensitively) in the title, the content or the
/// author's display name. Sorting is stable, so calling this twice on the
/// same input yields the same order.
#[must_use]
pub fn view(results: &[Post], filters: &Filters, sort_by: SortBy) -> Vec<Post> {
    let needle = filters.keyword.trim().to_lowercase();

    let mut shown: Vec<Post> = results
        .iter()
        .filter(|post| filters.admits_platform(&post.platform))
        .filter(|post| needle.is_empty() || matches_keyword(post, &needle))
        .cloned()
        .collect();

    sort_posts(&mut shown, sort_by);
    shown
}

/// Sort in place by `sort_by`.
pub fn sort_posts(posts: &mut [Post], sort_by: SortBy) {
    match sort_by {
        SortBy::Time => posts.sort_by_cached_key(|post| {
            (
                Reverse(publish_time_ms(&post.publish_time)),
                format!("{}{}", post.platform.code(), post.post_id),
            )
        }),
        SortBy::Hot => posts.sort_by_key(|post| Reverse(post.like_count)),
        SortBy::Comments => posts.sort_by_key(|post| Reverse(post.comment_count)),
    }
}

fn matches_keyword(post: &Post, needle: &str) -> bool {
    [
        post.title.as_str(),
        post.content.as_str(),
        post.author.display_name(),
    ]
    .iter()
    .any(|field| field.to_lowercase().contains(needle))
}
