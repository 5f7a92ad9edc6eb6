//! `hints results`: the live result set as a table.

use clap::{Args, Subcommand};
use hints_core::{Platform, Post};
use hints_engine::{ellipsize, SortBy};

use super::Context;

#[derive(Debug, Subcommand)]
pub enum ResultsCommands {
    /// Show one post with its comments
    Show {
        /// Composite key, `<platform>-<post_id>`
        key: String,
    },
    /// Drop the live results, filters and selection
    Clear,
}

/// Filter and sort flags. They are saved with the results, so they keep
/// applying to later `results`, `export` and `select all` calls.
#[derive(Debug, Args)]
pub struct ResultsArgs {
    /// Show only these platforms (repeatable); `--platform all` resets
    #[arg(long = "platform")]
    pub platforms: Vec<String>,
    /// Case-insensitive match on title, content or author name; empty resets
    #[arg(long)]
    pub keyword: Option<String>,
    /// `time`, `hot` or `comments`
    #[arg(long)]
    pub sort: Option<SortBy>,
    /// Maximum rows to print
    #[arg(long, default_value = "20")]
    pub limit: usize,
}

/// # Errors
///
/// Returns an error if updated filters cannot be saved.
pub(crate) fn run_results_list(ctx: &Context, args: &ResultsArgs) -> anyhow::Result<()> {
    let mut store = ctx.results();

    if !args.platforms.is_empty() {
        let platforms: Vec<Platform> = if args.platforms.iter().any(|p| p == "all") {
            Vec::new()
        } else {
            args.platforms.iter().map(|p| Platform::from(p.as_str())).collect()
        };
        store.set_platform_filter(platforms)?;
    }
    if let Some(keyword) = &args.keyword {
        store.set_keyword_filter(keyword.clone())?;
    }
    if let Some(sort) = args.sort {
        store.set_sort_by(sort)?;
    }

    if store.results().is_empty() {
        println!("no results yet; run `hints search` first");
        return Ok(());
    }

    let filters = store.filters();
    println!(
        "{} of {} posts (sort: {}, platforms: {}, keyword: {:?}, selected: {})",
        store.view().len(),
        store.results().len(),
        store.sort_by(),
        if filters.platforms.is_empty() {
            "all".to_string()
        } else {
            filters.platforms.iter().map(Platform::code).collect::<Vec<_>>().join(",")
        },
        filters.keyword,
        store.selection().len()
    );
    print_posts(store.view().iter().take(args.limit), |p| {
        store.selection().contains(&p.key())
    });

    Ok(())
}

/// # Errors
///
/// Returns an error if `key` is not among the live results.
pub(crate) async fn run_results_show(ctx: &Context, key: &str) -> anyhow::Result<()> {
    let store = ctx.results();
    super::detail::show_post(ctx, store.results(), key, None).await
}

/// # Errors
///
/// Returns an error if the cleared state cannot be saved.
pub(crate) fn run_results_clear(ctx: &Context) -> anyhow::Result<()> {
    ctx.results().clear()?;
    println!("results cleared");
    Ok(())
}

pub(crate) fn print_posts<'a>(
    posts: impl Iterator<Item = &'a Post>,
    is_selected: impl Fn(&Post) -> bool,
) {
    println!(
        "  {:<24}{:>8}{:>8}  {:<21}TITLE",
        "KEY", "LIKES", "CMTS", "PUBLISHED"
    );
    for post in posts {
        let title = if post.title.trim().is_empty() {
            &post.content
        } else {
            &post.title
        };
        println!(
            "{} {:<24}{:>8}{:>8}  {:<21}{}",
            if is_selected(post) { '*' } else { ' ' },
            ellipsize(&post.key(), 21),
            post.like_count,
            post.comment_count,
            ellipsize(&post.publish_time.as_text(), 19),
            ellipsize(&title.replace('\n', " "), 40)
        );
    }
}
