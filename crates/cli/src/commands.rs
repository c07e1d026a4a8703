//! Command handlers.

use crate::cli::Commands;
use forgeci_core::PipelineConfig;
use forgeci_github::pipeline::Pipeline;
use forgeci_github::sync;
use std::path::Path;
use tracing::debug;

/// Dispatch a parsed subcommand.
pub fn run(command: Commands) -> miette::Result<()> {
    match command {
        Commands::Generate { path, dry_run } => generate(&path, dry_run),
        Commands::Check { path } => check(&path),
    }
}

fn load_pipeline(root: &Path) -> Result<Pipeline, forgeci_core::Error> {
    debug!(root = %root.display(), "loading pipeline configuration");
    let config = PipelineConfig::load(root)?;
    Pipeline::from_config(&config)
}

#[allow(clippy::print_stdout)]
fn generate(root: &Path, dry_run: bool) -> miette::Result<()> {
    let pipeline = load_pipeline(root)?;
    if dry_run {
        print!("{}", pipeline.compile()?);
        return Ok(());
    }
    sync::generate(root, &pipeline)?;
    Ok(())
}

fn check(root: &Path) -> miette::Result<()> {
    let pipeline = load_pipeline(root)?;
    sync::check(root, &pipeline)?;
    Ok(())
}
