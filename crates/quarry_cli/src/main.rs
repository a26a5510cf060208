//! Command-line entry point for multi-column full-text search.
//!
//! # Responsibility
//! - Run one search against a SQLite database file.
//! - Print the ranked result envelope as pretty JSON on stdout.

use anyhow::{anyhow, Context};
use clap::Parser;
use log::info;
use quarry_core::{core_version, init_from_config, open_db, FullTextSearch, QuarryConfig};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "quarry", version, about = "Multi-column full-text search over SQLite")]
struct Cli {
    /// SQLite database file.
    #[arg(long)]
    db: PathBuf,

    /// Table to search.
    #[arg(long)]
    table: String,

    /// Columns to search, each ranked independently.
    #[arg(long, value_delimiter = ',', required = true)]
    columns: Vec<String>,

    /// Columns returned for every matching row.
    #[arg(long, value_delimiter = ',', required = true)]
    select: Vec<String>,

    #[arg(long, default_value_t = 0)]
    offset: u64,

    /// Page size; defaults to the config value.
    #[arg(long)]
    limit: Option<u64>,

    /// Order expressions applied before relevance.
    #[arg(long)]
    order: Vec<String>,

    /// Raw JOIN clauses.
    #[arg(long)]
    join: Vec<String>,

    /// JSON config with allow lists, page size and logging.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Absolute directory for rotated log files; overrides the config.
    #[arg(long)]
    log_dir: Option<String>,

    /// Log level; overrides the config.
    #[arg(long)]
    log_level: Option<String>,

    /// Search terms.
    #[arg(required = true)]
    terms: Vec<String>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match cli.config.as_deref() {
        Some(path) => QuarryConfig::load(path)?,
        None => QuarryConfig::default(),
    };
    config.override_logging(cli.log_dir, cli.log_level);
    init_from_config(&config).map_err(|err| anyhow!(err))?;
    info!(
        "event=cli_start module=cli status=ok core_version={}",
        core_version()
    );

    let conn = open_db(&cli.db)
        .with_context(|| format!("failed to open database `{}`", cli.db.display()))?;

    let mut search = FullTextSearch::with_config(&conn, &config);
    search
        .search(cli.table, cli.terms)
        .columns(cli.columns)
        .select(cli.select)
        .limit(cli.offset, cli.limit.unwrap_or(config.default_limit))
        .order(cli.order)
        .join(cli.join);

    let envelope = search.execute()?;
    info!(
        "event=cli_search module=cli status=ok columns={} duration_s={:.3}",
        envelope.columns.len(),
        envelope.performance
    );
    println!("{}", serde_json::to_string_pretty(envelope)?);
    Ok(())
}
