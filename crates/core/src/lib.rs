//! Core types for forgeci: the error taxonomy and the declarative pipeline
//! configuration loaded from `forgeci.toml`.

pub mod config;
pub mod error;

pub use config::{ConfigStep, PipelineConfig, PublishRef, PublishRefKind};
pub use error::{Error, Result};
