//! probcat CLI — problemset catalog crawler and query tool.
//!
//! Sweeps a paginated problem listing into a local deduplicated catalog
//! and answers partial-criteria queries against it.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
