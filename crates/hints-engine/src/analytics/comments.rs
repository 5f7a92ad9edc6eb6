//! Comment-level rankings over comments embedded in post payloads.

use std::collections::HashMap;

use hints_core::{Comment, Post};
use serde::{Deserialize, Serialize};

use super::rankings::{rank_by_count, AuthorRef};
use crate::text::{collapse_whitespace, prefix_chars};

/// Comments sharing this many leading characters (after whitespace
/// collapsing) are counted as the same comment.
const COMMENT_KEY_CHARS: usize = 50;
const MAX_NAMES_PER_COMMENT: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrequentComment {
    /// Normalized comment prefix used as the grouping key.
    pub text: String,
    pub count: usize,
    /// Up to five distinct commenter names, in first-seen order.
    pub authors: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommenterRank {
    pub author: AuthorRef,
    pub comment_count: usize,
}

/// All comments embedded under `platform_data.comments`, post order preserved.
pub(crate) fn flatten_comments(posts: &[Post]) -> Vec<Comment> {
    posts
        .iter()
        .flat_map(|post| {
            post.embedded_comments().into_iter().map(|mut comment| {
                if comment.platform.is_unknown() {
                    comment.platform = post.platform.clone();
                }
                comment
            })
        })
        .collect()
}

pub(crate) fn high_frequency_comments(comments: &[Comment], limit: usize) -> Vec<FrequentComment> {
    let mut names: HashMap<String, Vec<String>> = HashMap::new();

    let keyed: Vec<(String, String)> = comments
        .iter()
        .filter_map(|comment| {
            let collapsed = collapse_whitespace(&comment.content);
            if collapsed.is_empty() {
                return None;
            }
            let key = prefix_chars(&collapsed, COMMENT_KEY_CHARS).to_string();

            let seen = names.entry(key.clone()).or_default();
            let name = comment.author.display_name();
            if !name.is_empty()
                && seen.len() < MAX_NAMES_PER_COMMENT
                && !seen.iter().any(|n| n == name)
            {
                seen.push(name.to_string());
            }
            Some((key.clone(), key))
        })
        .collect();

    rank_by_count(keyed, limit)
        .into_iter()
        .map(|(text, count)| FrequentComment {
            authors: names.remove(&text).unwrap_or_default(),
            text,
            count,
        })
        .collect()
}

pub(crate) fn top_commenters(comments: &[Comment], limit: usize) -> Vec<CommenterRank> {
    let keyed = comments.iter().map(|comment| {
        (
            (comment.author.author_id.as_str(), comment.platform.code()),
            AuthorRef::from_author(&comment.author, &comment.platform),
        )
    });

    rank_by_count(keyed, limit)
        .into_iter()
        .map(|(author, comment_count)| CommenterRank {
            author,
            comment_count,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use hints_core::{Author, Platform, TimeValue};
    use serde_json::json;

    use super::*;

    fn post_with_comments(platform: Platform, id: &str, comments: serde_json::Value) -> Post {
        let mut platform_data = serde_json::Map::new();
        platform_data.insert("comments".to_string(), comments);
        Post {
            platform,
            post_id: id.to_string(),
            title: String::new(),
            content: String::new(),
            author: Author::default(),
            publish_time: TimeValue::Missing,
            like_count: 0,
            comment_count: 0,
            share_count: 0,
            collect_count: None,
            url: String::new(),
            image_urls: Vec::new(),
            video_url: None,
            platform_data,
        }
    }

    fn comment(id: &str, author: &str, content: &str) -> serde_json::Value {
        json!({
            "comment_id": id,
            "content": content,
            "author": { "author_id": author, "author_name": format!("N{author}") }
        })
    }

    #[test]
    fn flatten_inherits_post_platform() {
        let posts = vec![post_with_comments(
            Platform::Xhs,
            "p1",
            json!([comment("c1", "u1", "hi")]),
        )];
        let flat = flatten_comments(&posts);
        assert_eq!(flat.len(), 1);
        assert_eq!(flat[0].platform, Platform::Xhs);
    }

    #[test]
    fn frequent_comments_group_on_normalized_prefix() {
        let long = format!("{}tail one", "a".repeat(50));
        let long_other = format!("{}tail two", "a".repeat(50));
        let posts = vec![post_with_comments(
            Platform::Douyin,
            "p1",
            json!([
                comment("1", "u1", "求链接"),
                comment("2", "u2", "  求链接 "),
                comment("3", "u1", "求链接"),
                comment("4", "u3", &long),
                comment("5", "u4", &long_other),
                comment("6", "u5", "   "),
            ]),
        )];
        let ranked = high_frequency_comments(&flatten_comments(&posts), 10);

        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].text, "求链接");
        assert_eq!(ranked[0].count, 3);
        assert_eq!(ranked[0].authors, vec!["Nu1", "Nu2"]);
        assert_eq!(ranked[1].count, 2, "long comments share a 50-char prefix");
    }

    #[test]
    fn commenter_names_are_capped_at_five() {
        let items: Vec<serde_json::Value> = (0..8)
            .map(|i| comment(&i.to_string(), &format!("u{i}"), "same"))
            .collect();
        let posts = vec![post_with_comments(Platform::Douyin, "p", json!(items))];
        let ranked = high_frequency_comments(&flatten_comments(&posts), 10);
        assert_eq!(ranked[0].count, 8);
        assert_eq!(ranked[0].authors.len(), 5);
    }

    #[test]
    fn top_commenters_group_by_author_and_platform() {
        let posts = vec![
            post_with_comments(
                Platform::Douyin,
                "p1",
                json!([comment("1", "u1", "a"), comment("2", "u2", "b")]),
            ),
            post_with_comments(Platform::Xhs, "p2", json!([comment("3", "u1", "c")])),
            post_with_comments(Platform::Douyin, "p3", json!([comment("4", "u2", "d")])),
        ];
        let ranked = top_commenters(&flatten_comments(&posts), 10);
        assert_eq!(ranked.len(), 3);
        assert_eq!(ranked[0].author.author_id, "u2");
        assert_eq!(ranked[0].comment_count, 2);
    }
}
