//! CLI entry point for the scripted drag-and-drop simulation

use clap::Parser;
use slotgrid::io::cli::{Cli, SimulationRunner};
use tracing_subscriber::EnvFilter;

fn main() -> slotgrid::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut runner = SimulationRunner::new(cli);
    runner.run()?;
    Ok(())
}
