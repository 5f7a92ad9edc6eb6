use clap::Subcommand;

use super::Context;

#[derive(Debug, Subcommand)]
pub enum SelectCommands {
    /// Toggle one post by key (`<platform>-<post_id>`)
    Toggle { key: String },
    /// Select every post in the current filtered view
    All,
    /// Deselect everything
    Clear,
}

/// # Errors
///
/// Returns an error if the selection cannot be saved.
pub(crate) fn run_select(ctx: &Context, command: SelectCommands) -> anyhow::Result<()> {
    let mut store = ctx.results();
    match command {
        SelectCommands::Toggle { key } => {
            let selected = store.toggle_selection(&key)?;
            let known = store.results().iter().any(|p| p.key() == key);
            println!(
                "{key} {}{}",
                if selected { "selected" } else { "deselected" },
                if known { "" } else { " (not in the current results)" }
            );
        }
        SelectCommands::All => {
            store.select_all_displayed()?;
            println!("{} posts selected", store.selection().len());
        }
        SelectCommands::Clear => {
            store.clear_selection()?;
            println!("selection cleared");
        }
    }
    Ok(())
}
