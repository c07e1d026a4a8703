//! Command-line argument definitions.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// The forgeci command line.
#[derive(Parser, Debug)]
#[command(name = "forgeci")]
#[command(about = "Generates and verifies GitHub Actions workflows for sbt builds")]
#[command(version)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Commands,

    /// Log filter, e.g. `warn`, `debug`, or `forgeci_github=trace`.
    #[arg(short = 'l', long, global = true, default_value = "warn")]
    pub level: String,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write the workflow files under .github/workflows
    Generate {
        /// Project root containing forgeci.toml
        #[arg(long, short = 'p', default_value = ".")]
        path: PathBuf,
        /// Print the compiled workflow instead of writing files
        #[arg(long)]
        dry_run: bool,
    },
    /// Verify the generated workflow files are current
    Check {
        /// Project root containing forgeci.toml
        #[arg(long, short = 'p', default_value = ".")]
        path: PathBuf,
    },
}

/// Parse the process arguments.
#[must_use]
pub fn parse() -> Cli {
    Cli::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_generate() {
        let cli = Cli::try_parse_from(["forgeci", "generate", "--path", "/tmp/project"]).unwrap();
        match cli.command {
            Commands::Generate { path, dry_run } => {
                assert_eq!(path, PathBuf::from("/tmp/project"));
                assert!(!dry_run);
            }
            Commands::Check { .. } => unreachable!("parsed the wrong subcommand"),
        }
    }

    #[test]
    fn test_parse_check_with_level() {
        let cli = Cli::try_parse_from(["forgeci", "check", "--level", "debug"]).unwrap();
        assert_eq!(cli.level, "debug");
        assert!(matches!(cli.command, Commands::Check { .. }));
    }

    #[test]
    fn test_unknown_subcommand_fails() {
        assert!(Cli::try_parse_from(["forgeci", "frobnicate"]).is_err());
    }
}
