mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::commands::{
    Context, ExportArgs, HistoryCommands, LlmCommands, ResultsArgs, ResultsCommands,
    SearchArgs, SelectCommands,
};

#[derive(Debug, Parser)]
#[command(name = "hints")]
#[command(about = "getsomehints command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run a search across platforms; Ctrl-C stops it
    Search(SearchArgs),
    /// List the live results, show one post, or clear them
    #[command(args_conflicts_with_subcommands = true)]
    Results {
        #[command(subcommand)]
        command: Option<ResultsCommands>,
        #[command(flatten)]
        args: ResultsArgs,
    },
    /// Print the analytics report as JSON
    Analyze {
        /// Analyse a saved history record instead of the live results
        #[arg(long)]
        history: Option<String>,
        /// Backend task to analyse remotely when no posts are held locally
        #[arg(long)]
        task: Option<String>,
    },
    /// Export posts as CSV, JSON or plain text
    Export(ExportArgs),
    /// Change the post selection
    Select {
        #[command(subcommand)]
        command: SelectCommands,
    },
    /// Browse and prune the search history
    History {
        #[command(subcommand)]
        command: HistoryCommands,
    },
    /// LLM lead analysis and its saved results
    Llm {
        #[command(subcommand)]
        command: LlmCommands,
    },
    /// Follow the backend log stream, reconnecting when it drops
    Logs {
        /// Read frames (one JSON object per line) from stdin instead
        #[arg(long)]
        stdin: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = hints_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("hints ready (backend {}); see --help", config.api_base_url);
        return Ok(());
    };

    let ctx = Context::open(config)?;
    match command {
        Commands::Search(args) => commands::search::run_search(&ctx, args).await,
        Commands::Results { command, args } => match command {
            Some(ResultsCommands::Show { key }) => {
                commands::results::run_results_show(&ctx, &key).await
            }
            Some(ResultsCommands::Clear) => commands::results::run_results_clear(&ctx),
            None => commands::results::run_results_list(&ctx, &args),
        },
        Commands::Analyze { history, task } => {
            commands::analyze::run_analyze(&ctx, history.as_deref(), task.as_deref()).await
        }
        Commands::Export(args) => commands::export::run_export(&ctx, &args),
        Commands::Select { command } => commands::select::run_select(&ctx, command),
        Commands::History { command } => commands::history::run_history(&ctx, command).await,
        Commands::Llm { command } => commands::llm::run_llm(&ctx, command).await,
        Commands::Logs { stdin } => commands::logs::run_logs(&ctx, stdin).await,
    }
}
