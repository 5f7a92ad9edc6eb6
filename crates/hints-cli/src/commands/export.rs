//! `hints export`: write posts to a file (or stdout for plain text).

use std::path::PathBuf;

use chrono::Local;
use clap::Args;
use hints_engine::export::{
    export_file_name, posts_to_clipboard_text, posts_to_csv, posts_to_json, ExportFormat,
};
use hints_engine::ExportError;

use super::{history_record, Context};

const DEFAULT_EXPORT_BASE: &str = "getsomehints";

#[derive(Debug, Args)]
pub struct ExportArgs {
    /// Export a saved history record instead of the live view
    #[arg(long)]
    pub history: Option<String>,
    /// `csv`, `json` or `text`
    #[arg(long, default_value = "csv")]
    pub format: ExportFormat,
    /// Output file; defaults to `<keyword>_<date>.<ext>` in the current
    /// directory. Text without `--out` goes to stdout.
    #[arg(long)]
    pub out: Option<PathBuf>,
    /// Only the selected posts of the live view
    #[arg(long, conflicts_with = "history")]
    pub selected: bool,
}

/// # Errors
///
/// Returns an error for an unknown history id or when the file cannot be
/// written. An empty export is a notice, not an error.
pub(crate) fn run_export(ctx: &Context, args: &ExportArgs) -> anyhow::Result<()> {
    let (posts, base) = if let Some(id) = &args.history {
        let record = history_record(&ctx.history(), id)?;
        (record.results, record.keyword)
    } else {
        let store = ctx.results();
        let posts = if args.selected {
            store.selected_posts()
        } else {
            store.view().to_vec()
        };
        (posts, DEFAULT_EXPORT_BASE.to_string())
    };

    let rendered = match args.format {
        ExportFormat::Csv => posts_to_csv(&posts),
        ExportFormat::Json => posts_to_json(&posts),
        ExportFormat::Text => posts_to_clipboard_text(&posts),
    };
    let contents = match rendered {
        Ok(contents) => contents,
        Err(ExportError::Empty) => {
            println!("nothing to export");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    let path = match (&args.out, args.format) {
        (Some(path), _) => path.clone(),
        (None, ExportFormat::Text) => {
            print!("{contents}");
            return Ok(());
        }
        (None, format) => PathBuf::from(export_file_name(
            &base,
            format.extension(),
            Local::now().date_naive(),
        )),
    };

    std::fs::write(&path, contents)?;
    tracing::info!(path = %path.display(), posts = posts.len(), "export written");
    println!("exported {} posts to {}", posts.len(), path.display());
    Ok(())
}
