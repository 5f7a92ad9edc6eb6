//! Top-N rankings over posts and comments.
//!
//! Grouping keeps first-seen order and the final sort is stable, so ties
//! resolve to whichever group appeared first in the input.

use std::collections::HashMap;
use std::hash::Hash;

use hints_core::{Author, ContentType, Platform, Post};
use serde::{Deserialize, Serialize};

use crate::text::ellipsize;

pub(crate) const TOP_N: usize = 10;
const TOP_POST_TITLE_CHARS: usize = 50;

/// Author identity as reported in rankings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorRef {
    pub author_id: String,
    pub author_name: String,
    pub platform: Platform,
}

impl AuthorRef {
    pub(crate) fn from_author(author: &Author, platform: &Platform) -> Self {
        Self {
            author_id: author.author_id.clone(),
            author_name: author.display_name().to_string(),
            platform: platform.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorRank {
    pub author: AuthorRef,
    pub post_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopPost {
    pub post_id: String,
    pub platform: Platform,
    /// Title (or content when untitled) cut to 50 characters plus `...`.
    pub title: String,
    pub like_count: u64,
    pub comment_count: u64,
    pub content_type: ContentType,
}

/// Count occurrences per key, remembering the first value seen for each key.
///
/// Returns `(first_value, count)` in descending count order, ties in
/// first-seen order, cut to `limit`.
pub(crate) fn rank_by_count<K, V, I>(items: I, limit: usize) -> Vec<(V, usize)>
where
    K: Eq + Hash,
    I: IntoIterator<Item = (K, V)>,
{
    let mut slots: HashMap<K, usize> = HashMap::new();
    let mut groups: Vec<(V, usize)> = Vec::new();

    for (key, value) in items {
        match slots.get(&key) {
            Some(&idx) => groups[idx].1 += 1,
            None => {
                slots.insert(key, groups.len());
                groups.push((value, 1));
            }
        }
    }

    groups.sort_by(|a, b| b.1.cmp(&a.1));
    groups.truncate(limit);
    groups
}

pub(crate) fn top_authors(posts: &[Post], limit: usize) -> Vec<AuthorRank> {
    let keyed = posts.iter().map(|post| {
        (
            (post.author.author_id.as_str(), post.platform.code()),
            AuthorRef::from_author(&post.author, &post.platform),
        )
    });

    rank_by_count(keyed, limit)
        .into_iter()
        .map(|(author, post_count)| AuthorRank { author, post_count })
        .collect()
}

pub(crate) fn top_posts(posts: &[Post], limit: usize) -> Vec<TopPost> {
    let mut ranked: Vec<&Post> = posts.iter().collect();
    ranked.sort_by(|a, b| b.like_count.cmp(&a.like_count));

    ranked
        .into_iter()
        .take(limit)
        .map(|post| {
            let title = if post.title.trim().is_empty() {
                &post.content
            } else {
                &post.title
            };
            TopPost {
                post_id: post.post_id.clone(),
                platform: post.platform.clone(),
                title: ellipsize(title, TOP_POST_TITLE_CHARS),
                like_count: post.like_count,
                comment_count: post.comment_count,
                content_type: post.content_type(),
            }
        })
        .collect()
}
