//! forgeci binary entry point.

mod cli;
mod commands;

use miette::IntoDiagnostic;
use tracing_subscriber::EnvFilter;

fn main() -> miette::Result<()> {
    let cli = cli::parse();
    init_tracing(&cli.level)?;
    commands::run(cli.command)
}

fn init_tracing(level: &str) -> miette::Result<()> {
    let filter = EnvFilter::try_new(level).into_diagnostic()?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}
