use hints_core::Post;

use super::{csv_line, BOM};
use crate::error::ExportError;
use crate::text::ellipsize;

const CSV_HEADER: [&str; 12] = [
    "平台", "ID", "标题", "内容", "作者", "作者ID", "发布时间", "点赞数", "评论数", "分享数", "收藏数", "链接",
];

const CLIPBOARD_CONTENT_CHARS: usize = 200;

/// BOM-prefixed CSV, header first, one row per post, rows joined by `\n`.
///
/// # Errors
///
/// Returns [`ExportError::Empty`] when `posts` is empty.
pub fn posts_to_csv(posts: &[Post]) -> Result<String, ExportError> {
    if posts.is_empty() {
        return Err(ExportError::Empty);
    }

    let mut lines = Vec::with_capacity(posts.len() + 1);
    lines.push(CSV_HEADER.join(","));
    for post in posts {
        lines.push(csv_line([
            post.platform.code().to_string(),
            post.post_id.clone(),
            post.title.clone(),
            post.content.clone(),
            post.author.author_name.clone(),
            post.author.author_id.clone(),
            post.publish_time.as_text(),
            post.like_count.to_string(),
            post.comment_count.to_string(),
            post.share_count.to_string(),
            post.collect_count.map(|n| n.to_string()).unwrap_or_default(),
            post.url.clone(),
        ]));
    }

    Ok(format!("{BOM}{}", lines.join("\n")))
}

/// Pretty-printed JSON array of the full post records.
///
/// # Errors
///
/// Returns [`ExportError::Empty`] for no posts, or [`ExportError::Serialize`].
pub fn posts_to_json(posts: &[Post]) -> Result<String, ExportError> {
    if posts.is_empty() {
        return Err(ExportError::Empty);
    }
    serde_json::to_string_pretty(posts).map_err(|source| ExportError::Serialize {
        context: "posts".to_string(),
        source,
    })
}

/// Human-readable blocks, one per post, separated by a blank line.
///
/// # Errors
///
/// Returns [`ExportError::Empty`] when `posts` is empty.
pub fn posts_to_clipboard_text(posts: &[Post]) -> Result<String, ExportError> {
    if posts.is_empty() {
        return Err(ExportError::Empty);
    }

    let blocks: Vec<String> = posts
        .iter()
        .enumerate()
        .map(|(idx, post)| {
            let content = if post.content.is_empty() {
                String::new()
            } else {
                format!("内容: {}", ellipsize(&post.content, CLIPBOARD_CONTENT_CHARS))
            };
            format!(
                "[{n}] {platform}\n标题: {title}\n作者: {name} (@{id})\n发布时间: {time}\n\
                 点赞: {likes} | 评论: {comments} | 分享: {shares}\n链接: {url}\n{content}\n---\n",
                n = idx + 1,
                platform = post.platform.code().to_uppercase(),
                title = post.title,
                name = post.author.author_name,
                id = post.author.author_id,
                time = post.publish_time.as_text(),
                likes = post.like_count,
                comments = post.comment_count,
                shares = post.share_count,
                url = post.url,
            )
        })
        .collect();

    Ok(blocks.join("\n"))
}
