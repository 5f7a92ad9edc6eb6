//! `hints llm`: run the lead analysis and manage its saved results.

use std::path::PathBuf;

use chrono::Local;
use clap::Subcommand;
use hints_client::{LeadsRequest, DEFAULT_LLM_MODEL};
use hints_core::{AnalysisDraft, AnalysisRecord, LeadsResult, LlmScenario};
use hints_engine::export::{analyses_to_csv, analyses_to_json, export_file_name, ExportFormat};
use hints_engine::{ellipsize, ExportError};

use super::{history_record, Context};

#[derive(Debug, Subcommand)]
pub enum LlmCommands {
    /// Analyse posts for potential sellers and buyers and save the result
    Run {
        /// Name for the saved analysis; defaults to the keyword or "选中帖子"
        #[arg(long)]
        name: Option<String>,
        #[arg(long, default_value = DEFAULT_LLM_MODEL)]
        model: String,
        /// Scenario id from `hints llm scenarios`
        #[arg(long)]
        scene: Option<String>,
        /// Analyse a saved history record
        #[arg(long, conflicts_with = "task")]
        history: Option<String>,
        /// Let the backend load the posts of a task
        #[arg(long)]
        task: Option<String>,
    },
    /// List saved analyses, newest first
    List,
    /// Print one saved analysis
    Show { id: String },
    /// Delete saved analyses by id
    Delete {
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Delete every saved analysis
    Clear,
    /// Export saved analyses (all when no ids are given)
    Export {
        ids: Vec<String>,
        /// `csv` or `json`
        #[arg(long, default_value = "csv")]
        format: ExportFormat,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// List the analysis scenarios the backend offers
    Scenarios,
}

/// # Errors
///
/// Returns an error when the backend call fails, an id is unknown, or the
/// analysis log cannot be saved.
pub(crate) async fn run_llm(ctx: &Context, command: LlmCommands) -> anyhow::Result<()> {
    match command {
        LlmCommands::Run {
            name,
            model,
            scene,
            history,
            task,
        } => run_leads(ctx, name, model, scene, history.as_deref(), task).await,
        LlmCommands::List => {
            let log = ctx.analyses();
            if log.records().is_empty() {
                println!("no analyses yet");
                return Ok(());
            }
            println!(
                "{:<34}{:<18}{:>6}{:>8}{:>8}  NAME",
                "ID", "CREATED", "POSTS", "SELLERS", "BUYERS"
            );
            for record in log.records() {
                println!(
                    "{:<34}{:<18}{:>6}{:>8}{:>8}  {}",
                    record.id,
                    record.created_at.format("%Y-%m-%d %H:%M"),
                    record.draft.posts_count,
                    record.draft.result.potential_sellers.len(),
                    record.draft.result.potential_buyers.len(),
                    ellipsize(&record.draft.name, 30)
                );
            }
            Ok(())
        }
        LlmCommands::Show { id } => {
            let log = ctx.analyses();
            let record = log
                .get(&id)
                .ok_or_else(|| anyhow::anyhow!("analysis '{id}' not found"))?;
            print_analysis(record);
            Ok(())
        }
        LlmCommands::Delete { ids } => {
            let removed = ctx.analyses().delete_many(&ids)?;
            println!("deleted {removed} of {} analyses", ids.len());
            Ok(())
        }
        LlmCommands::Clear => {
            ctx.analyses().clear()?;
            println!("analyses cleared");
            Ok(())
        }
        LlmCommands::Export { ids, format, out } => export_analyses(ctx, &ids, format, out),
        LlmCommands::Scenarios => {
            let scenarios = ctx.client()?.llm_scenarios().await?;
            if scenarios.is_empty() {
                println!("the backend offers no scenarios");
            }
            for s in &scenarios {
                println!("{:<20}{}  ({} / {})", s.id, s.name, s.seller_label, s.buyer_label);
            }
            Ok(())
        }
    }
}

async fn run_leads(
    ctx: &Context,
    name: Option<String>,
    model: String,
    scene: Option<String>,
    history_id: Option<&str>,
    task: Option<String>,
) -> anyhow::Result<()> {
    let client = ctx.client()?;

    let (request, posts_count, default_name) = if let Some(task_id) = task {
        (LeadsRequest::for_task(task_id.clone()), 0, task_id)
    } else {
        let (posts, default_name) = match history_id {
            Some(id) => {
                let record = history_record(&ctx.history(), id)?;
                (record.results, record.keyword)
            }
            None => (ctx.results().selected_posts(), "选中帖子".to_string()),
        };
        if posts.is_empty() {
            anyhow::bail!("no posts to analyse; select posts or pass --history / --task");
        }
        let count = posts.len();
        (LeadsRequest::for_posts(posts), count, default_name)
    };
    let request = request.with_model(model.clone()).with_scene(scene.clone());

    // Scenario names and labels are best effort.
    let scenario = match &scene {
        Some(id) => match client.llm_scenarios().await {
            Ok(list) => list.into_iter().find(|s| &s.id == id),
            Err(e) => {
                tracing::warn!(error = %e, "could not load llm scenarios");
                None
            }
        },
        None => None,
    };

    println!("analysing with {model}...");
    let result = client
        .llm_leads(&request)
        .await
        .map_err(|e| anyhow::anyhow!("llm analysis failed: {}", e.user_message()))?;

    let draft = build_draft(
        name.unwrap_or(default_name),
        model,
        posts_count,
        result,
        scene,
        scenario,
    );
    let id = ctx.analyses().add(draft)?;
    tracing::info!(id = %id, "llm analysis saved");

    let log = ctx.analyses();
    if let Some(record) = log.get(&id) {
        print_analysis(record);
    }
    println!("saved as {id}");
    Ok(())
}

fn build_draft(
    name: String,
    model: String,
    posts_count: usize,
    result: LeadsResult,
    scene: Option<String>,
    scenario: Option<LlmScenario>,
) -> AnalysisDraft {
    let (scene_name, seller_label, buyer_label) = match scenario {
        Some(s) => (Some(s.name), Some(s.seller_label), Some(s.buyer_label)),
        None => (None, None, None),
    };
    AnalysisDraft {
        name,
        model,
        posts_count,
        result,
        scene,
        scene_name,
        seller_label,
        buyer_label,
    }
}

fn export_analyses(
    ctx: &Context,
    ids: &[String],
    format: ExportFormat,
    out: Option<PathBuf>,
) -> anyhow::Result<()> {
    let log = ctx.analyses();
    let records: Vec<AnalysisRecord> = if ids.is_empty() {
        log.records().to_vec()
    } else {
        ids.iter()
            .map(|id| {
                log.get(id)
                    .cloned()
                    .ok_or_else(|| anyhow::anyhow!("analysis '{id}' not found"))
            })
            .collect::<anyhow::Result<_>>()?
    };

    let rendered = match format {
        ExportFormat::Csv => analyses_to_csv(&records),
        ExportFormat::Json => analyses_to_json(&records),
        ExportFormat::Text => anyhow::bail!("analyses export as csv or json only"),
    };
    let contents = match rendered {
        Ok(contents) => contents,
        Err(ExportError::Empty) => {
            println!("nothing to export");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    let path = out.unwrap_or_else(|| {
        PathBuf::from(export_file_name(
            "llm_leads",
            format.extension(),
            Local::now().date_naive(),
        ))
    });
    std::fs::write(&path, contents)?;
    println!("exported {} analyses to {}", records.len(), path.display());
    Ok(())
}

fn print_analysis(record: &AnalysisRecord) {
    let result = &record.draft.result;
    println!(
        "{} ({}, {} posts)",
        record.draft.name, record.draft.model, record.draft.posts_count
    );
    if !record.scenario().is_empty() {
        println!("scenario: {}", record.scenario());
    }
    if let Some(summary) = &result.analysis_summary {
        println!("\n{summary}");
    }

    println!("\n{} ({})", record.seller_label(), result.potential_sellers.len());
    for s in &result.potential_sellers {
        println!(
            "  [{}] {} {}: {}",
            s.platform,
            s.author_name,
            s.contacts.join(","),
            ellipsize(&s.reason, 60)
        );
    }

    println!("\n{} ({})", record.buyer_label(), result.potential_buyers.len());
    for b in &result.potential_buyers {
        println!(
            "  [{}] {} <{}> {}: {}",
            b.platform,
            b.author_name,
            b.intent_label(),
            b.contacts.join(","),
            ellipsize(&b.reason, 60)
        );
    }

    if !result.contacts_summary.is_empty() {
        println!("\ncontacts");
        for c in &result.contacts_summary {
            println!(
                "  [{}] {} {}: {} ({})",
                c.platform, c.author_id, c.contact_type, c.value, c.source
            );
        }
    }
}
