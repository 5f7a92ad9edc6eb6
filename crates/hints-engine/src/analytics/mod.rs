//! Derived summaries over a fixed result set.
//!
//! [`AnalysisReport::from_posts`] is the live mode. The remote mode (backend
//! analytics endpoints) lives in `hints-client` and produces the same
//! [`AnalysisReport`] shape.

mod buckets;
mod comments;
mod rankings;

use std::collections::{BTreeMap, HashSet};

use hints_core::{ContentType, Platform, Post};
use serde::{Deserialize, Serialize};

use crate::timestamp::{day_key, publish_time_ms, rfc3339};

pub use buckets::Bucket;
pub use comments::{CommenterRank, FrequentComment};
pub use rankings::{AuthorRank, AuthorRef, TopPost};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformStats {
    pub platform: Platform,
    pub post_count: usize,
    pub comment_count: u64,
    pub author_count: usize,
    pub avg_likes: f64,
    pub avg_comments: f64,
}

/// Earliest and latest parsable publish time.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TimeRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub total_posts: usize,
    pub total_comments: u64,
    pub total_authors: usize,
    pub platform_stats: Vec<PlatformStats>,
    pub time_range: TimeRange,
    pub content_type_distribution: BTreeMap<String, usize>,
    pub like_buckets: Vec<Bucket>,
    pub comment_buckets: Vec<Bucket>,
    pub platform_distribution: BTreeMap<String, usize>,
    /// Posts per publish day (`YYYY-MM-DD`); undated posts are left out.
    pub trend: BTreeMap<String, usize>,
    pub top_authors: Vec<AuthorRank>,
    pub top_posts: Vec<TopPost>,
    pub high_frequency_comments: Vec<FrequentComment>,
    pub top_commenters: Vec<CommenterRank>,
}

impl AnalysisReport {
    /// Compute every summary from `posts`.
    #[must_use]
    pub fn from_posts(posts: &[Post]) -> Self {
        let comments = comments::flatten_comments(posts);

        Self {
            total_posts: posts.len(),
            total_comments: posts.iter().map(|p| p.comment_count).sum(),
            total_authors: distinct_authors(posts.iter()),
            platform_stats: platform_stats(posts),
            time_range: time_range(posts),
            content_type_distribution: content_type_distribution(posts),
            like_buckets: buckets::like_buckets(posts.iter().map(|p| p.like_count)),
            comment_buckets: buckets::comment_buckets(posts.iter().map(|p| p.comment_count)),
            platform_distribution: platform_distribution(posts),
            trend: trend(posts),
            top_authors: rankings::top_authors(posts, rankings::TOP_N),
            top_posts: rankings::top_posts(posts, rankings::TOP_N),
            high_frequency_comments: comments::high_frequency_comments(&comments, rankings::TOP_N),
            top_commenters: comments::top_commenters(&comments, rankings::TOP_N),
        }
    }

    /// Count in the like bucket labelled `range` (e.g. `"1k-10k"`).
    #[must_use]
    pub fn like_bucket(&self, range: &str) -> Option<usize> {
        bucket_count(&self.like_buckets, range)
    }

    #[must_use]
    pub fn comment_bucket(&self, range: &str) -> Option<usize> {
        bucket_count(&self.comment_buckets, range)
    }
}

/// Empty like/comment histograms with every label present.
#[must_use]
pub fn empty_buckets() -> (Vec<Bucket>, Vec<Bucket>) {
    (
        buckets::like_buckets(std::iter::empty()),
        buckets::comment_buckets(std::iter::empty()),
    )
}

fn bucket_count(buckets: &[Bucket], range: &str) -> Option<usize> {
    buckets.iter().find(|b| b.range == range).map(|b| b.count)
}

fn distinct_authors<'a>(posts: impl Iterator<Item = &'a Post>) -> usize {
    posts
        .map(|p| (p.author.author_id.as_str(), p.platform.code()))
        .collect::<HashSet<_>>()
        .len()
}

#[allow(clippy::cast_precision_loss)]
fn mean(sum: u64, n: usize) -> f64 {
    if n == 0 {
        0.0
    } else {
        sum as f64 / n as f64
    }
}

fn platform_stats(posts: &[Post]) -> Vec<PlatformStats> {
    let mut by_platform: BTreeMap<&str, Vec<&Post>> = BTreeMap::new();
    for post in posts {
        by_platform.entry(post.platform.code()).or_default().push(post);
    }

    by_platform
        .into_values()
        .map(|group| {
            let likes: u64 = group.iter().map(|p| p.like_count).sum();
            let comments: u64 = group.iter().map(|p| p.comment_count).sum();
            PlatformStats {
                platform: group[0].platform.clone(),
                post_count: group.len(),
                comment_count: comments,
                author_count: distinct_authors(group.iter().copied()),
                avg_likes: mean(likes, group.len()),
                avg_comments: mean(comments, group.len()),
            }
        })
        .collect()
}

fn time_range(posts: &[Post]) -> TimeRange {
    let times: Vec<i64> = posts
        .iter()
        .map(|p| publish_time_ms(&p.publish_time))
        .filter(|&ms| ms != 0)
        .collect();

    TimeRange {
        start: times.iter().min().and_then(|&ms| rfc3339(ms)),
        end: times.iter().max().and_then(|&ms| rfc3339(ms)),
    }
}

fn content_type_distribution(posts: &[Post]) -> BTreeMap<String, usize> {
    let mut dist: BTreeMap<String, usize> = ContentType::ALL
        .iter()
        .map(|ct| (ct.as_str().to_string(), 0))
        .collect();
    for post in posts {
        *dist.entry(post.content_type().as_str().to_string()).or_default() += 1;
    }
    dist
}

fn platform_distribution(posts: &[Post]) -> BTreeMap<String, usize> {
    let mut dist = BTreeMap::new();
    for post in posts {
        *dist.entry(post.platform.code().to_string()).or_default() += 1;
    }
    dist
}

fn trend(posts: &[Post]) -> BTreeMap<String, usize> {
    let mut days = BTreeMap::new();
    for day in posts
        .iter()
        .filter_map(|p| day_key(publish_time_ms(&p.publish_time)))
    {
        *days.entry(day).or_default() += 1;
    }
    days
}

#[cfg(test)]
mod tests {
    use hints_core::{Author, TimeValue};

    use super::*;

    fn post(platform: Platform, id: &str, author: &str, likes: u64, comments: u64) -> Post {
        Post {
            platform: platform.clone(),
            post_id: id.to_string(),
            title: format!("t{id}"),
            content: String::new(),
            author: Author {
                author_id: author.to_string(),
                author_name: author.to_uppercase(),
                platform,
                ..Author::default()
            },
            publish_time: TimeValue::Missing,
            like_count: likes,
            comment_count: comments,
            share_count: 0,
            collect_count: None,
            url: String::new(),
            image_urls: Vec::new(),
            video_url: None,
            platform_data: serde_json::Map::new(),
        }
    }

    #[test]
    fn like_buckets_for_three_posts() {
        let posts = vec![
            post(Platform::Douyin, "1", "a", 50, 0),
            post(Platform::Douyin, "2", "a", 500, 0),
            post(Platform::Xhs, "3", "b", 5000, 0),
        ];
        let report = AnalysisReport::from_posts(&posts);
        assert_eq!(report.like_bucket("0-100"), Some(1));
        assert_eq!(report.like_bucket("101-1k"), Some(1));
        assert_eq!(report.like_bucket("1k-10k"), Some(1));
        assert_eq!(report.like_bucket("10k+"), Some(0));
    }

    #[test]
    fn overview_and_platform_totals_agree() {
        let posts = vec![
            post(Platform::Xhs, "1", "a", 10, 4),
            post(Platform::Douyin, "2", "a", 20, 6),
            post(Platform::Douyin, "3", "b", 30, 0),
            post(Platform::Douyin, "4", "b", 0, 2),
        ];
        let report = AnalysisReport::from_posts(&posts);

        assert_eq!(report.total_posts, 4);
        assert_eq!(report.total_comments, 12);
        assert_eq!(report.total_authors, 3, "(author, platform) pairs");
        assert_eq!(
            report.platform_stats.iter().map(|s| s.post_count).sum::<usize>(),
            report.total_posts
        );

        let dy = &report.platform_stats[0];
        assert_eq!(dy.platform, Platform::Douyin, "ordered by platform code");
        assert_eq!(dy.author_count, 2);
        assert!((dy.avg_likes - 50.0 / 3.0).abs() < 1e-9);
        assert!((dy.avg_comments - 8.0 / 3.0).abs() < 1e-9);
        assert_eq!(report.platform_distribution.get("dy"), Some(&3));
    }

    #[test]
    fn bucket_counts_sum_to_total() {
        let posts: Vec<Post> = (0..25)
            .map(|i| post(Platform::Douyin, &i.to_string(), "a", i * 997, i * 61))
            .collect();
        let report = AnalysisReport::from_posts(&posts);
        let likes: usize = report.like_buckets.iter().map(|b| b.count).sum();
        let comments: usize = report.comment_buckets.iter().map(|b| b.count).sum();
        assert_eq!(likes, 25);
        assert_eq!(comments, 25);
    }

    #[test]
    fn trend_and_time_range_skip_undated_posts() {
        let mut posts = vec![
            post(Platform::Douyin, "1", "a", 0, 0),
            post(Platform::Douyin, "2", "a", 0, 0),
            post(Platform::Douyin, "3", "a", 0, 0),
        ];
        posts[0].publish_time = TimeValue::from("2024-01-02 10:00:00");
        posts[1].publish_time = TimeValue::from(1_704_067_200);
        posts[2].publish_time = TimeValue::from("unknown");

        let report = AnalysisReport::from_posts(&posts);
        assert_eq!(
            report.trend.into_iter().collect::<Vec<_>>(),
            vec![("2024-01-01".to_string(), 1), ("2024-01-02".to_string(), 1)]
        );
        assert_eq!(report.time_range.start.as_deref(), Some("2024-01-01T00:00:00Z"));
        assert_eq!(report.time_range.end.as_deref(), Some("2024-01-02T10:00:00Z"));
    }

    #[test]
    fn content_types_are_always_listed() {
        let mut posts = vec![post(Platform::Xhs, "1", "a", 0, 0)];
        posts[0].image_urls.push("i.jpg".to_string());
        let report = AnalysisReport::from_posts(&posts);
        assert_eq!(report.content_type_distribution.get("image_text"), Some(&1));
        assert_eq!(report.content_type_distribution.get("video"), Some(&0));
        assert_eq!(report.content_type_distribution.get("link"), Some(&0));
    }

    #[test]
    fn empty_input_produces_zeroed_report() {
        let report = AnalysisReport::from_posts(&[]);
        assert_eq!(report.total_posts, 0);
        assert!(report.platform_stats.is_empty());
        assert!(report.trend.is_empty());
        assert_eq!(report.like_buckets.len(), 4);
        assert_eq!(report.time_range, TimeRange::default());
    }
}
