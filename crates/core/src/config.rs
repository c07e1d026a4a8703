//! Declarative pipeline configuration.
//!
//! The configuration mirrors what the generated workflow needs and nothing
//! else; every field has a default so a minimal `forgeci.toml` (or none at
//! all) still describes a working pipeline. The structure is built once and
//! threaded explicitly into the assembler — there is no ambient lookup.

use crate::error::{Error, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::debug;

/// File name looked up at the project root.
pub const CONFIG_FILE: &str = "forgeci.toml";

/// The declarative description of a project's CI pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Workflow name displayed in the GitHub UI.
    pub name: String,
    /// Branch patterns that trigger the workflow on push and pull request.
    pub branches: Vec<String>,
    /// Pull request activity types, canonical lower-snake-case names.
    pub pr_event_types: Vec<String>,
    /// Workflow-level environment variables.
    pub env: IndexMap<String, String>,
    /// Runner OS matrix axis.
    pub oses: Vec<String>,
    /// Scala version matrix axis.
    pub scalas: Vec<String>,
    /// Java version matrix axis, in setup-scala notation (e.g. `adopt@1.11`).
    pub javas: Vec<String>,
    /// The sbt invocation used by generated sbt steps.
    pub sbt_command: String,
    /// Command the build job runs to verify the workflows are current.
    pub check_command: String,
    /// Glob patterns hashed into the dependency cache key.
    pub dependency_globs: Vec<String>,
    /// Directories restored and saved by the dependency cache step.
    pub cache_paths: Vec<String>,
    /// Target directories carried from the build job to the publish job.
    pub artifact_targets: Vec<String>,
    /// Build steps; when empty, a plain `sbt test` step is generated.
    pub build: Vec<ConfigStep>,
    /// Steps inserted after the shared preamble in the build job.
    pub build_preamble: Vec<ConfigStep>,
    /// Publish steps; when empty, a plain `sbt +publish` step is generated.
    pub publish: Vec<ConfigStep>,
    /// Steps inserted after the artifact download in the publish job.
    pub publish_preamble: Vec<ConfigStep>,
    /// Reference predicates gating the publish job. Empty disables it.
    pub publish_refs: Vec<PublishRef>,
    /// Extra condition ANDed onto the publish job's gate.
    pub publish_cond: Option<String>,
    /// Additional matrix axes for the build job.
    pub matrix_adds: IndexMap<String, Vec<String>>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            name: "Continuous Integration".to_owned(),
            branches: vec!["**".to_owned()],
            pr_event_types: vec![
                "opened".to_owned(),
                "reopened".to_owned(),
                "synchronize".to_owned(),
            ],
            env: IndexMap::new(),
            oses: vec!["ubuntu-latest".to_owned()],
            scalas: vec!["2.13.14".to_owned()],
            javas: vec!["adopt@1.11".to_owned()],
            sbt_command: "sbt".to_owned(),
            check_command: "forgeci check".to_owned(),
            dependency_globs: vec![
                "**/*.sbt".to_owned(),
                "project/build.properties".to_owned(),
            ],
            cache_paths: vec![
                "~/.sbt".to_owned(),
                "~/.ivy2/cache".to_owned(),
                "~/.coursier/cache/v1".to_owned(),
                "~/.cache/coursier/v1".to_owned(),
                "~/AppData/Local/Coursier/Cache/v1".to_owned(),
                "~/Library/Caches/Coursier/v1".to_owned(),
            ],
            artifact_targets: vec!["target".to_owned()],
            build: Vec::new(),
            build_preamble: Vec::new(),
            publish: Vec::new(),
            publish_preamble: Vec::new(),
            publish_refs: vec![PublishRef::equals_branch("main")],
            publish_cond: None,
            matrix_adds: IndexMap::new(),
        }
    }
}

impl PipelineConfig {
    /// Load the configuration from `<root>/forgeci.toml`.
    ///
    /// A missing file yields the default configuration; an unreadable or
    /// syntactically invalid one is an error naming the path.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] when the file exists but cannot be read and
    /// [`Error::ConfigParse`] when it is not valid TOML.
    pub fn load(root: &Path) -> Result<Self> {
        let path = root.join(CONFIG_FILE);
        if !path.is_file() {
            debug!(path = %path.display(), "no configuration file, using defaults");
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(&path).map_err(|e| Error::io(path.clone(), e))?;
        let config = toml::from_str(&raw).map_err(|e| Error::config_parse(path.clone(), e))?;
        debug!(path = %path.display(), "loaded pipeline configuration");
        Ok(config)
    }
}

/// A workflow step as written in `forgeci.toml`.
///
/// Exactly one of `run`, `sbt`, or `uses` must be set; the assembler
/// rejects anything else.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct ConfigStep {
    /// Step display name.
    pub name: Option<String>,
    /// Identifier for referencing step outputs.
    pub id: Option<String>,
    /// Conditional execution expression.
    #[serde(rename = "if")]
    pub cond: Option<String>,
    /// Shell commands, one per line of the rendered `run:` block.
    pub run: Vec<String>,
    /// sbt commands, executed through the configured sbt invocation.
    pub sbt: Vec<String>,
    /// A reusable action in `owner/repo@ref` notation.
    pub uses: Option<String>,
    /// Keyword parameters for `uses` steps.
    pub with: IndexMap<String, String>,
    /// Step-level environment variables.
    pub env: IndexMap<String, String>,
}

/// Kind of comparison a [`PublishRef`] performs against `github.ref`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum PublishRefKind {
    /// The reference equals the target exactly.
    #[default]
    Equals,
    /// The reference contains the target name.
    Contains,
    /// The reference starts with the target name.
    StartsWith,
    /// The reference ends with the target name.
    EndsWith,
}

/// A reference predicate gating the publish job, as written in the
/// configuration file. Exactly one of `branch` or `tag` must be set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct PublishRef {
    /// Comparison kind.
    #[serde(rename = "type")]
    pub kind: PublishRefKind,
    /// Branch name to compare against.
    pub branch: Option<String>,
    /// Tag name to compare against.
    pub tag: Option<String>,
}

impl PublishRef {
    /// Predicate matching pushes to the named branch exactly.
    #[must_use]
    pub fn equals_branch(name: impl Into<String>) -> Self {
        Self {
            kind: PublishRefKind::Equals,
            branch: Some(name.into()),
            tag: None,
        }
    }

    /// Predicate matching tags starting with the given prefix.
    #[must_use]
    pub fn starts_with_tag(prefix: impl Into<String>) -> Self {
        Self {
            kind: PublishRefKind::StartsWith,
            branch: None,
            tag: Some(prefix.into()),
        }
    }
}
