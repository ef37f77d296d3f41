//! docpub CLI — build, spell-check, and publish documentation packages.
//!
//! Drives the orchestrator once per requested package, sequentially.

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
