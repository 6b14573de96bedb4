//! Weft CLI.
//!
//! - `weft run` starts repeating workers and prints their patterns to stdout
//! - `weft launch` starts an external program and returns immediately

mod cli;

use anyhow::{Context, Result};
use clap::Parser;

use cli::{execute, Cli};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    weft::logging::init(cli.verbose, cli.quiet).context("Failed to install logging")?;
    execute(cli).await
}
