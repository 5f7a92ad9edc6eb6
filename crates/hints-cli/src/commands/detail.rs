//! Post detail with its comments, shared by `results show` and `history show --post`.

use hints_core::{Comment, Post};

use super::Context;

/// Print one post and its comments. Embedded comments are used when the post
/// carries any; otherwise they are fetched, scoped to `task_id` when known.
///
/// # Errors
///
/// Returns an error if `key` is not among `posts` or the client cannot be built.
pub(crate) async fn show_post(
    ctx: &Context,
    posts: &[Post],
    key: &str,
    task_id: Option<&str>,
) -> anyhow::Result<()> {
    let post = find_post(posts, key)?;
    let comments = ctx.client()?.comments_for(post, task_id).await;
    for line in detail_lines(post, &comments) {
        println!("{line}");
    }
    Ok(())
}

pub(crate) fn find_post<'a>(posts: &'a [Post], key: &str) -> anyhow::Result<&'a Post> {
    posts
        .iter()
        .find(|p| p.key() == key)
        .ok_or_else(|| anyhow::anyhow!("post '{key}' not found"))
}

fn detail_lines(post: &Post, comments: &[Comment]) -> Vec<String> {
    let mut lines = vec![
        format!("[{}] {}", post.platform.code(), post.title),
        format!(
            "author:    {} (@{})",
            post.author.display_name(),
            post.author.author_id
        ),
        format!("published: {}", post.publish_time.as_text()),
        format!(
            "likes {} | comments {} | shares {}",
            post.like_count, post.comment_count, post.share_count
        ),
    ];
    if !post.url.is_empty() {
        lines.push(format!("url:       {}", post.url));
    }
    if let Some(video) = post.video_url.as_deref().filter(|v| !v.is_empty()) {
        lines.push(format!("video:     {video}"));
    }
    if !post.image_urls.is_empty() {
        lines.push(format!("images:    {}", post.image_urls.len()));
    }
    if !post.content.trim().is_empty() {
        lines.push(String::new());
        lines.push(post.content.clone());
    }

    lines.push(String::new());
    lines.push(format!("comments ({})", comments.len()));
    for c in comments {
        let replies = if c.sub_comment_count > 0 {
            format!(" [{} replies]", c.sub_comment_count)
        } else {
            String::new()
        };
        lines.push(format!(
            "  {} ({} likes, {}){replies}: {}",
            c.author.display_name(),
            c.like_count,
            c.comment_time.as_text(),
            c.content.replace('\n', " ")
        ));
    }
    lines
}
