//! Error types for workflow compilation and synchronization.

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for forgeci operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while compiling or synchronizing workflows.
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    /// An environment variable key that cannot be rendered.
    #[error("'{key}' is not a valid environment variable name")]
    #[diagnostic(
        code(forgeci::invalid_env_key),
        help(
            "environment variable names must not contain spaces, ':', '#', or start with a YAML indicator character"
        )
    )]
    InvalidEnvKey {
        /// The offending key
        key: String,
    },

    /// A generated workflow file no longer matches the configuration.
    #[error("{} is out of date", path.display())]
    #[diagnostic(
        code(forgeci::stale_workflow),
        help("run `forgeci generate` and commit the updated workflow files")
    )]
    StaleWorkflow {
        /// The stale file
        path: PathBuf,
    },

    /// The pipeline configuration is invalid.
    #[error("Configuration error: {message}")]
    #[diagnostic(code(forgeci::config), help("{help}"))]
    Config {
        /// The error message
        message: String,
        /// Help text for the user
        help: String,
    },

    /// Failed to parse the configuration file.
    #[error("Invalid TOML in {}: {source}", path.display())]
    #[diagnostic(
        code(forgeci::config_parse),
        help("fix the syntax error in forgeci.toml and retry")
    )]
    ConfigParse {
        /// The configuration file path
        path: PathBuf,
        /// The underlying parse error
        #[source]
        source: Box<toml::de::Error>,
    },

    /// Failed to read or write a file.
    #[error("I/O error on {}: {source}", path.display())]
    #[diagnostic(code(forgeci::io))]
    Io {
        /// The path that caused the error
        path: PathBuf,
        /// The underlying source error
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Create a new invalid environment key error.
    #[must_use]
    pub fn invalid_env_key(key: impl Into<String>) -> Self {
        Self::InvalidEnvKey { key: key.into() }
    }

    /// Create a new stale workflow error.
    #[must_use]
    pub fn stale_workflow(path: impl Into<PathBuf>) -> Self {
        Self::StaleWorkflow { path: path.into() }
    }

    /// Create a new configuration error.
    #[must_use]
    pub fn config(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            help: help.into(),
        }
    }

    /// Create a new configuration parse error.
    #[must_use]
    pub fn config_parse(path: impl Into<PathBuf>, source: toml::de::Error) -> Self {
        Self::ConfigParse {
            path: path.into(),
            source: Box::new(source),
        }
    }

    /// Create a new I/O error with path context.
    #[must_use]
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
