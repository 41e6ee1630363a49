use anyhow::Result;
use clap::Parser;

use pinterpal::{cli::Cli, runtime::Orchestrator, utils::init_logger};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logger(cli.verbose);

    let orchestrator = Orchestrator::new(cli)?;
    if !orchestrator.run().await? {
        std::process::exit(1);
    }

    Ok(())
}
