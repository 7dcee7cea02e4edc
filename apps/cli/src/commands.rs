//! CLI command definitions, routing, and tracing setup.

use std::time::Duration;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tokio_util::sync::CancellationToken;
use tracing::info;

use probcat_core::{NarrowBy, Resolution, SweepReport, Sweeper, run_scheduler};
use probcat_shared::{AppConfig, SearchFilters, init_config, load_config};
use probcat_storage::Storage;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// probcat — crawl a problemset listing into a local catalog and query it.
#[derive(Parser)]
#[command(
    name = "probcat",
    version,
    about = "Crawl a paginated problemset listing into a deduplicated local catalog and query it.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Run one crawl-and-ingest sweep and exit.
    Sweep,

    /// Run sweeps on a schedule until interrupted.
    Run {
        /// Override the configured interval between sweeps, in seconds.
        #[arg(long)]
        interval_secs: Option<u64>,
    },

    /// Query the catalog by any combination of name, rank, and tag.
    Query {
        /// Substring of the problem name.
        #[arg(short, long)]
        name: Option<String>,

        /// Exact difficulty rank.
        #[arg(short, long)]
        rank: Option<i64>,

        /// Tag name.
        #[arg(short, long)]
        tag: Option<String>,
    },

    /// List all distinct ranks in the catalog.
    Ranks,

    /// List all distinct tags in the catalog.
    Tags,

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "probcat=info",
        1 => "probcat=debug",
        _ => "probcat=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt().json().with_env_filter(env_filter).init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Sweep => cmd_sweep().await,
        Command::Run { interval_secs } => cmd_run(interval_secs).await,
        Command::Query { name, rank, tag } => cmd_query(SearchFilters { name, rank, tag }).await,
        Command::Ranks => cmd_ranks().await,
        Command::Tags => cmd_tags().await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(),
        },
    }
}

/// Writer-side open for `sweep`/`run`: creates the database and runs
/// migrations.
async fn open_storage(config: &AppConfig) -> Result<Storage> {
    let db_path = config.storage.resolved_db_path()?;
    Ok(Storage::open(&db_path).await?)
}

/// Query-side open: read-only, safe to run concurrently with a sweep
/// process that owns writes. Requires an already-created catalog.
async fn open_storage_readonly(config: &AppConfig) -> Result<Storage> {
    let db_path = config.storage.resolved_db_path()?;
    if !db_path.exists() {
        return Err(eyre!(
            "no catalog database at '{}' — run `probcat sweep` first",
            db_path.display()
        ));
    }
    Ok(Storage::open_readonly(&db_path).await?)
}

// ---------------------------------------------------------------------------
// Sweep commands
// ---------------------------------------------------------------------------

async fn cmd_sweep() -> Result<()> {
    let config = load_config()?;
    let storage = open_storage(&config).await?;
    let sweeper = Sweeper::new(&config)?;

    let spinner = sweep_spinner();
    let report = sweeper.run_sweep(&storage, &CancellationToken::new()).await;
    spinner.finish_and_clear();

    print_report(&report?);
    Ok(())
}

async fn cmd_run(interval_secs: Option<u64>) -> Result<()> {
    let config = load_config()?;
    let storage = open_storage(&config).await?;
    let sweeper = Sweeper::new(&config)?;

    let interval = Duration::from_secs(interval_secs.unwrap_or(config.sweep.interval_secs));

    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupt received, stopping after current page");
            interrupt.cancel();
        }
    });

    info!(interval_secs = interval.as_secs(), "starting scheduler");
    run_scheduler(&sweeper, &storage, interval, &cancel).await;
    Ok(())
}

fn sweep_spinner() -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap()
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
    );
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner.set_message("sweeping listing pages...");
    spinner
}

fn print_report(report: &SweepReport) {
    println!();
    println!("  Sweep completed!");
    println!("  Pages:     {}", report.pages);
    println!("  Records:   {}", report.records);
    println!("  New items: {}", report.new_items);
    println!("  Skipped:   {}", report.skipped);
    println!("  Time:      {:.1}s", report.duration.as_secs_f64());
    println!();
}

// ---------------------------------------------------------------------------
// Query commands
// ---------------------------------------------------------------------------

async fn cmd_query(filters: SearchFilters) -> Result<()> {
    let config = load_config()?;
    let storage = open_storage_readonly(&config).await?;

    match probcat_core::resolve(&storage, &filters).await? {
        Resolution::Rows(rows) => {
            for row in &rows {
                let rank = row
                    .rank
                    .map(|r| r.to_string())
                    .unwrap_or_else(|| "-".to_string());
                let link = row.link.as_deref().unwrap_or("-");
                println!("{}\t{}\t{}", row.name, rank, link);
            }
            info!(matches = rows.len(), "query resolved");
        }
        Resolution::Narrow(NarrowBy::Rank(ranks)) => {
            println!("Too many matches. Add --rank to narrow; available ranks:");
            let ranks: Vec<String> = ranks.iter().map(|r| r.to_string()).collect();
            println!("  {}", ranks.join(", "));
        }
        Resolution::Narrow(NarrowBy::Tag(tags)) => {
            println!("Too many matches. Add --tag to narrow; available tags:");
            println!("  {}", tags.join(", "));
        }
        Resolution::NotFound => println!("No matches."),
        Resolution::InvalidFilters => {
            println!("Supply at least one of --name, --rank, --tag.");
        }
    }
    Ok(())
}

async fn cmd_ranks() -> Result<()> {
    let config = load_config()?;
    let storage = open_storage_readonly(&config).await?;
    for rank in probcat_core::list_distinct_ranks(&storage).await? {
        println!("{rank}");
    }
    Ok(())
}

async fn cmd_tags() -> Result<()> {
    let config = load_config()?;
    let storage = open_storage_readonly(&config).await?;
    for tag in probcat_core::list_distinct_tags(&storage).await? {
        println!("{tag}");
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Config commands
// ---------------------------------------------------------------------------

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use probcat_shared::{ProblemRecord, StorageConfig};
    use uuid::Uuid;

    fn config_for(db_path: &std::path::Path) -> AppConfig {
        AppConfig {
            storage: StorageConfig {
                db_path: db_path.to_string_lossy().to_string(),
            },
            ..Default::default()
        }
    }

    fn temp_db_path() -> std::path::PathBuf {
        std::env::temp_dir().join(format!("probcat_cli_test_{}.db", Uuid::now_v7()))
    }

    #[tokio::test]
    async fn query_side_open_rejects_writes() {
        let db_path = temp_db_path();

        // Sweep-side open creates the catalog.
        let rw = open_storage(&config_for(&db_path)).await.unwrap();
        rw.upsert_problem(&ProblemRecord {
            name: Some("Two Sum - 4A".into()),
            ..Default::default()
        })
        .await
        .unwrap();
        drop(rw);

        // Query-side open reads it but cannot write to it.
        let ro = open_storage_readonly(&config_for(&db_path)).await.unwrap();
        let rows = ro.search_by_name("Two Sum", None, None).await.unwrap();
        assert_eq!(rows.len(), 1);

        let result = ro
            .upsert_problem(&ProblemRecord {
                name: Some("Other - 5B".into()),
                ..Default::default()
            })
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn query_side_open_requires_existing_catalog() {
        let db_path = temp_db_path();
        let err = open_storage_readonly(&config_for(&db_path))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("probcat sweep"));
        // The read-only path never creates the database as a side effect.
        assert!(!db_path.exists());
    }
}
