// file: src/main.rs
// description: commandline application entry point with command handling
// reference: application bootstrap and orchestration

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use note_search::utils::logging::{format_error, format_info, format_success, format_warning};
use note_search::{Config, JsonExporter, JsonNoteStore, SemanticSearch, Validator, tokenizer};
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "note_search")]
#[command(author = "cipher")]
#[command(version = "0.1.0")]
#[command(about = "Semantic search over notes using a language model", long_about = None)]
struct Cli {
    #[arg(
        short,
        long,
        value_name = "FILE",
        default_value = "config/default.toml"
    )]
    config: PathBuf,

    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    color: bool,

    #[arg(short, long, action = ArgAction::SetTrue)]
    verbose: bool,

    /// Notes export to search (overrides corpus.notes_path)
    #[arg(long, value_name = "FILE", env = "NOTE_SEARCH_NOTES")]
    notes: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Find the owner's notes relevant to a free-text query
    Search {
        /// Search query text
        query: String,

        #[arg(short, long)]
        owner: String,

        /// Print the response as JSON instead of a summary
        #[arg(long)]
        json: bool,

        /// Write the response and a manifest into this directory
        #[arg(long, value_name = "DIR")]
        export: Option<PathBuf>,

        #[arg(long)]
        pretty: bool,

        #[arg(long)]
        no_progress: bool,
    },

    /// Show how the owner's notes would be partitioned, without calling the model
    Clusters {
        #[arg(short, long)]
        owner: String,
    },

    /// Print the effective configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    note_search::utils::logging::init_logger(cli.color, cli.verbose);

    info!("Loading configuration from: {}", cli.config.display());

    let mut config = if cli.config.exists() {
        Config::load(Some(cli.config.as_path())).context("Failed to load configuration")?
    } else {
        warn!(
            "Config file {} not found, using default configuration",
            cli.config.display()
        );
        Config::load(None).unwrap_or_else(|e| {
            warn!("Falling back to built-in defaults: {}", e);
            Config::default_config()
        })
    };

    if let Some(notes) = cli.notes {
        config.corpus.notes_path = notes;
    }

    match cli.command {
        Commands::Search {
            query,
            owner,
            json,
            export,
            pretty,
            no_progress,
        } => {
            cmd_search(&config, &owner, &query, json, export, pretty, !no_progress && cli.color)
                .await?;
        }
        Commands::Clusters { owner } => {
            cmd_clusters(&config, &owner).await?;
        }
        Commands::Config => {
            cmd_config(&config)?;
        }
    }

    Ok(())
}

async fn build_engine(config: &Config) -> Result<SemanticSearch> {
    let corpus = JsonNoteStore::load(&config.corpus.notes_path)
        .await
        .context("Failed to load notes")?;
    let counter = tokenizer::from_config(&config.tokenizer).context("Failed to load tokenizer")?;

    SemanticSearch::from_config(config, Arc::new(corpus), counter)
        .context("Failed to initialize search engine")
}

async fn cmd_search(
    config: &Config,
    owner: &str,
    query: &str,
    json: bool,
    export: Option<PathBuf>,
    pretty: bool,
    show_progress: bool,
) -> Result<()> {
    Validator::validate_query(query)?;

    if config.llm.api_key.is_none() {
        println!(
            "{}",
            format_warning("No API key configured (set GROQ_API_KEY or llm.api_key)")
        );
    }

    let engine = build_engine(config).await?.with_progress(show_progress);

    let cancel = CancellationToken::new();
    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, returning results gathered so far");
            ctrl_c.cancel();
        }
    });

    let response = match engine.search_with_cancel(owner, query, cancel).await {
        Ok(response) => response,
        Err(e) => {
            println!("{}", format_error(&format!("Search failed: {}", e)));
            return Err(e.into());
        }
    };

    if let Some(dir) = export {
        let exporter = JsonExporter::new(&dir).context("Failed to create export directory")?;
        let manifest = exporter.export_search(owner, query, &response, pretty)?;
        println!(
            "{}",
            format_success(&format!(
                "Exported {} document(s) to {}",
                manifest.total_documents,
                dir.display()
            ))
        );
    }

    if json {
        let body = if pretty {
            serde_json::to_string_pretty(&response)?
        } else {
            serde_json::to_string(&response)?
        };
        println!("{}", body);
        return Ok(());
    }

    if response.is_empty() {
        println!("\nNo relevant notes found for query: \"{}\"\n", query);
    } else {
        println!("\nSearch Results for: \"{}\"\n", query);
        println!("{}", "=".repeat(80));
        println!("{}", response.format_summary(200));
        println!("{}", "=".repeat(80));
    }

    if response.partial {
        println!(
            "{}",
            format_warning(&format!(
                "Partial results: {} cluster(s) failed, {} abandoned{}",
                response.failures.len(),
                response.stats.clusters_abandoned,
                if response.deadline_exceeded {
                    " (deadline exceeded)"
                } else {
                    ""
                }
            ))
        );
    }

    Ok(())
}

async fn cmd_clusters(config: &Config, owner: &str) -> Result<()> {
    Validator::validate_owner_id(owner)?;

    let engine = build_engine(config).await?;
    let clusters = engine.plan_for_owner(owner).await?;

    if clusters.is_empty() {
        println!("{}", format_info(&format!("Owner {} has no notes", owner)));
        return Ok(());
    }

    println!(
        "\n{} cluster(s) under a budget of {} tokens\n",
        clusters.len(),
        config.search.token_budget
    );

    for (idx, cluster) in clusters.iter().enumerate() {
        let marker = if cluster.is_oversized(config.search.token_budget) {
            " (oversized, sent whole)"
        } else {
            ""
        };
        println!(
            "{:>4}. {} document(s), {} tokens{}",
            idx + 1,
            cluster.len(),
            cluster.token_cost,
            marker
        );

        for document in &cluster.documents {
            let first_line = document.text.lines().next().unwrap_or_default();
            println!(
                "        {} {}",
                document.id,
                Validator::truncate_text(first_line, 60)
            );
        }
    }

    Ok(())
}

fn cmd_config(config: &Config) -> Result<()> {
    let mut shown = config.clone();
    if shown.llm.api_key.is_some() {
        shown.llm.api_key = Some("********".to_string());
    }

    println!("{}", serde_json::to_string_pretty(&shown)?);
    Ok(())
}
