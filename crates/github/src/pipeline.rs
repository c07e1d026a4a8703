//! Default two-job pipeline assembly.
//!
//! Builds the standard build-and-test plus conditional publish pipeline
//! out of configurable fragments: preambles, cache steps, artifact
//! upload/download steps, and OS-specific fixups.

use crate::emitter::{compile_branch_predicate, compile_workflow};
use crate::schema::{PrEventType, Ref, RefPredicate, WorkflowJob, WorkflowStep};
use forgeci_core::config::{ConfigStep, PipelineConfig, PublishRef, PublishRefKind};
use forgeci_core::{Error, Result};
use indexmap::IndexMap;

/// Expression gating the Windows-only fixup steps at runtime.
const WINDOWS_GUARD: &str = "contains(runner.os, 'windows')";

/// A fully resolved pipeline, ready to compile.
///
/// All values are already concrete (version lists, glob patterns, step
/// lists); nothing is computed from build-tool state here.
#[derive(Debug, Clone)]
pub struct Pipeline {
    /// Workflow name.
    pub name: String,
    /// Push/PR trigger branch patterns.
    pub branches: Vec<String>,
    /// Pull request trigger activity types.
    pub pr_event_types: Vec<PrEventType>,
    /// Workflow-level environment variables.
    pub env: IndexMap<String, String>,
    /// Runner OS matrix axis.
    pub oses: Vec<String>,
    /// Scala version matrix axis.
    pub scalas: Vec<String>,
    /// Java version matrix axis.
    pub javas: Vec<String>,
    /// sbt invocation for generated sbt steps.
    pub sbt_command: String,
    /// Self-check command run by the build job.
    pub check_command: String,
    /// Glob patterns hashed into the cache key.
    pub dependency_globs: Vec<String>,
    /// Directories covered by the cache step.
    pub cache_paths: Vec<String>,
    /// Target directories carried to the publish job.
    pub artifact_targets: Vec<String>,
    /// Build steps.
    pub build_steps: Vec<WorkflowStep>,
    /// Steps inserted after the preamble in the build job.
    pub build_preamble: Vec<WorkflowStep>,
    /// Publish steps.
    pub publish_steps: Vec<WorkflowStep>,
    /// Steps inserted after the artifact download in the publish job.
    pub publish_preamble: Vec<WorkflowStep>,
    /// Predicates gating the publish job; empty disables it.
    pub publish_refs: Vec<RefPredicate>,
    /// Extra condition ANDed onto the publish gate.
    pub publish_cond: Option<String>,
    /// Extra matrix axes for the build job.
    pub matrix_adds: IndexMap<String, Vec<String>>,
    /// User-supplied jobs appended after the generated ones.
    pub extra_jobs: Vec<WorkflowJob>,
}

impl Default for Pipeline {
    // The default configuration is always convertible.
    #[allow(clippy::expect_used)]
    fn default() -> Self {
        Self::from_config(&PipelineConfig::default()).expect("default configuration is valid")
    }
}

impl Pipeline {
    /// Resolve a [`PipelineConfig`] into a pipeline.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when a matrix axis is empty, an event
    /// type name is unknown, a publish ref is ambiguous, or a config step
    /// does not name exactly one of `run`, `sbt`, or `uses`.
    pub fn from_config(config: &PipelineConfig) -> Result<Self> {
        for (axis, values) in [
            ("oses", &config.oses),
            ("scalas", &config.scalas),
            ("javas", &config.javas),
        ] {
            if values.is_empty() {
                return Err(Error::config(
                    format!("{axis} must not be empty"),
                    "every matrix axis needs at least one value",
                ));
            }
        }

        let pr_event_types = config
            .pr_event_types
            .iter()
            .map(|name| {
                PrEventType::from_name(name).ok_or_else(|| {
                    Error::config(
                        format!("unknown pull request event type '{name}'"),
                        "use canonical names such as 'opened', 'synchronize', or 'ready_for_review'",
                    )
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let publish_refs = config
            .publish_refs
            .iter()
            .map(resolve_publish_ref)
            .collect::<Result<Vec<_>>>()?;

        let build_steps = if config.build.is_empty() {
            vec![WorkflowStep::sbt(["test"]).with_name("Build project")]
        } else {
            resolve_steps(&config.build)?
        };
        let publish_steps = if config.publish.is_empty() {
            vec![WorkflowStep::sbt(["+publish"]).with_name("Publish project")]
        } else {
            resolve_steps(&config.publish)?
        };

        Ok(Self {
            name: config.name.clone(),
            branches: config.branches.clone(),
            pr_event_types,
            env: config.env.clone(),
            oses: config.oses.clone(),
            scalas: config.scalas.clone(),
            javas: config.javas.clone(),
            sbt_command: config.sbt_command.clone(),
            check_command: config.check_command.clone(),
            dependency_globs: config.dependency_globs.clone(),
            cache_paths: config.cache_paths.clone(),
            artifact_targets: config.artifact_targets.clone(),
            build_steps,
            build_preamble: resolve_steps(&config.build_preamble)?,
            publish_steps,
            publish_preamble: resolve_steps(&config.publish_preamble)?,
            publish_refs,
            publish_cond: config.publish_cond.clone(),
            matrix_adds: config.matrix_adds.clone(),
            extra_jobs: Vec::new(),
        })
    }

    /// Append a user-supplied job after the generated ones.
    #[must_use]
    pub fn with_extra_job(mut self, job: WorkflowJob) -> Self {
        self.extra_jobs.push(job);
        self
    }

    /// Compile the pipeline to the workflow document text.
    ///
    /// Deterministic: the same pipeline always yields identical text.
    pub fn compile(&self) -> Result<String> {
        compile_workflow(
            &self.name,
            &self.branches,
            &self.pr_event_types,
            &self.env,
            &self.jobs(),
            &self.sbt_command,
        )
    }

    fn has_windows(&self) -> bool {
        self.oses.iter().any(|os| os.contains("windows"))
    }

    fn publishing(&self) -> bool {
        !self.publish_refs.is_empty()
    }

    /// Shared preamble: Windows fixups when needed, checkout, runtime
    /// setup, then the generated cache steps.
    fn preamble(&self) -> Vec<WorkflowStep> {
        let mut steps = Vec::new();
        if self.has_windows() {
            steps.push(
                WorkflowStep::run(["git config --global core.autocrlf false"])
                    .with_name("Ignore line ending differences in git")
                    .with_cond(WINDOWS_GUARD),
            );
            steps.push(
                WorkflowStep::run([
                    "git config --global alias.repair-symlinks '!git checkout-index --force --all'",
                ])
                .with_name("Install repair-symlinks alias")
                .with_cond(WINDOWS_GUARD),
            );
        }
        steps.push(WorkflowStep::Checkout);
        steps.push(WorkflowStep::SetupScala);
        steps.extend(self.cache_steps());
        steps
    }

    fn cache_steps(&self) -> Vec<WorkflowStep> {
        let hashes: String = self
            .dependency_globs
            .iter()
            .map(|glob| format!("-${{{{ hashFiles('{glob}') }}}}"))
            .collect();
        vec![
            WorkflowStep::uses("actions", "cache", "v4")
                .with_name("Cache sbt")
                .with_param("path", self.cache_paths.join("\n"))
                .with_param("key", format!("${{{{ runner.os }}}}-sbt-cache-v2{hashes}")),
        ]
    }

    fn upload_steps(&self) -> Vec<WorkflowStep> {
        vec![
            WorkflowStep::run([format!(
                "tar cf targets.tar {}",
                self.artifact_targets.join(" ")
            )])
            .with_name("Compress target directories"),
            WorkflowStep::uses("actions", "upload-artifact", "v4")
                .with_name("Upload target directories")
                .with_param(
                    "name",
                    "target-${{ matrix.os }}-${{ matrix.scala }}-${{ matrix.java }}",
                )
                .with_param("path", "targets.tar"),
        ]
    }

    fn download_steps(&self) -> Vec<WorkflowStep> {
        self.scalas
            .iter()
            .flat_map(|scala| {
                [
                    WorkflowStep::uses("actions", "download-artifact", "v4")
                        .with_name(format!("Download target directories ({scala})"))
                        .with_param(
                            "name",
                            format!("target-${{{{ matrix.os }}}}-{scala}-${{{{ matrix.java }}}}"),
                        ),
                    WorkflowStep::run(["tar xf targets.tar", "rm targets.tar"])
                        .with_name(format!("Inflate target directories ({scala})")),
                ]
            })
            .collect()
    }

    fn check_step(&self) -> WorkflowStep {
        WorkflowStep::run([self.check_command.clone()])
            .with_name("Check that workflows are up to date")
    }

    fn build_job(&self) -> WorkflowJob {
        let mut steps = self.preamble();
        steps.extend(self.build_preamble.iter().cloned());
        steps.push(self.check_step());
        steps.extend(self.build_steps.iter().cloned());
        if self.publishing() {
            steps.extend(self.upload_steps());
        }
        WorkflowJob::new("build", "Build and Test", steps)
            .with_oses(self.oses.clone())
            .with_scalas(self.scalas.clone())
            .with_javas(self.javas.clone())
            .with_matrix_adds(self.matrix_adds.clone())
    }

    fn publish_job(&self) -> Option<WorkflowJob> {
        if !self.publishing() {
            return None;
        }

        let targets = self
            .publish_refs
            .iter()
            .map(|pred| compile_branch_predicate("github.ref", pred))
            .collect::<Vec<_>>()
            .join(" || ");
        let mut cond = format!("github.event_name != 'pull_request' && ({targets})");
        if let Some(extra) = &self.publish_cond {
            cond = format!("{cond} && ({extra})");
        }

        let mut steps = self.preamble();
        steps.extend(self.download_steps());
        steps.extend(self.publish_preamble.iter().cloned());
        steps.extend(self.publish_steps.iter().cloned());

        // Publishing is cross-built from a single matrix cell; sbt's
        // `+publish` walks the Scala versions itself.
        Some(
            WorkflowJob::new("publish", "Publish Artifacts", steps)
                .with_needs(["build"])
                .with_cond(cond)
                .with_oses(self.oses[..1].to_vec())
                .with_scalas(self.scalas[..1].to_vec())
                .with_javas(self.javas[..1].to_vec()),
        )
    }

    fn jobs(&self) -> Vec<WorkflowJob> {
        let mut jobs = vec![self.build_job()];
        jobs.extend(self.publish_job());
        jobs.extend(self.extra_jobs.iter().cloned());
        jobs
    }
}

fn resolve_publish_ref(publish_ref: &PublishRef) -> Result<RefPredicate> {
    let target = match (&publish_ref.branch, &publish_ref.tag) {
        (Some(branch), None) => Ref::Branch(branch.clone()),
        (None, Some(tag)) => Ref::Tag(tag.clone()),
        _ => {
            return Err(Error::config(
                "a publish ref must name exactly one of 'branch' or 'tag'",
                "write e.g. { type = \"equals\", branch = \"main\" }",
            ));
        }
    };
    Ok(match publish_ref.kind {
        PublishRefKind::Equals => RefPredicate::Equals(target),
        PublishRefKind::Contains => RefPredicate::Contains(target),
        PublishRefKind::StartsWith => RefPredicate::StartsWith(target),
        PublishRefKind::EndsWith => RefPredicate::EndsWith(target),
    })
}

fn resolve_steps(steps: &[ConfigStep]) -> Result<Vec<WorkflowStep>> {
    steps.iter().map(resolve_step).collect()
}

fn resolve_step(step: &ConfigStep) -> Result<WorkflowStep> {
    let mut resolved = match (&step.run[..], &step.sbt[..], &step.uses) {
        (run, [], None) if !run.is_empty() => WorkflowStep::run(run.iter().cloned()),
        ([], sbt, None) if !sbt.is_empty() => WorkflowStep::sbt(sbt.iter().cloned()),
        ([], [], Some(uses)) => {
            let (owner, rest) = uses.split_once('/').ok_or_else(|| bad_uses(uses))?;
            let (repo, git_ref) = rest.split_once('@').ok_or_else(|| bad_uses(uses))?;
            if owner.is_empty() || repo.is_empty() || git_ref.is_empty() {
                return Err(bad_uses(uses));
            }
            let mut resolved = WorkflowStep::uses(owner, repo, git_ref);
            for (key, value) in &step.with {
                resolved = resolved.with_param(key, value);
            }
            resolved
        }
        _ => {
            return Err(Error::config(
                "a step must set exactly one of 'run', 'sbt', or 'uses'",
                "split the step, or drop the extra field",
            ));
        }
    };

    if let Some(name) = &step.name {
        resolved = resolved.with_name(name);
    }
    if let Some(id) = &step.id {
        resolved = resolved.with_id(id);
    }
    if let Some(cond) = &step.cond {
        resolved = resolved.with_cond(cond);
    }
    for (key, value) in &step.env {
        resolved = resolved.with_env(key, value);
    }
    Ok(resolved)
}

fn bad_uses(uses: &str) -> Error {
    Error::config(
        format!("'{uses}' is not a valid action reference"),
        "write actions as 'owner/repo@ref', e.g. 'actions/checkout@v4'",
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_pipeline() -> Pipeline {
        Pipeline::from_config(&PipelineConfig::default()).unwrap()
    }

    #[test]
    fn test_default_pipeline_compiles_two_jobs() {
        let yaml = default_pipeline().compile().unwrap();
        assert!(yaml.contains("\n  build:\n"));
        assert!(yaml.contains("\n  publish:\n"));
        assert!(yaml.contains("    needs: [build]\n"));
    }

    #[test]
    fn test_build_job_step_order() {
        let pipeline = default_pipeline();
        let job = pipeline.build_job();
        assert_eq!(job.steps[0], WorkflowStep::Checkout);
        assert_eq!(job.steps[1], WorkflowStep::SetupScala);
        // cache, self-check, build, then upload (publishing is on by default)
        assert!(matches!(job.steps[2], WorkflowStep::Use { .. }));
        assert_eq!(
            job.steps[3],
            WorkflowStep::run(["forgeci check"])
                .with_name("Check that workflows are up to date")
        );
        assert_eq!(
            job.steps[4],
            WorkflowStep::sbt(["test"]).with_name("Build project")
        );
        assert!(job.steps.len() > 5, "upload steps present");
    }

    #[test]
    fn test_no_publish_refs_disables_publish_job_and_upload() {
        let config = PipelineConfig {
            publish_refs: vec![],
            ..PipelineConfig::default()
        };
        let pipeline = Pipeline::from_config(&config).unwrap();
        let yaml = pipeline.compile().unwrap();
        assert!(!yaml.contains("publish:"));
        assert!(!yaml.contains("upload-artifact"));
    }

    #[test]
    fn test_publish_cond_ors_predicates() {
        let config = PipelineConfig {
            publish_refs: vec![
                PublishRef::equals_branch("main"),
                PublishRef::starts_with_tag("v"),
            ],
            ..PipelineConfig::default()
        };
        let pipeline = Pipeline::from_config(&config).unwrap();
        let job = pipeline.publish_job().unwrap();
        assert_eq!(
            job.cond.as_deref(),
            Some(
                "github.event_name != 'pull_request' && (github.ref == 'refs/heads/main' || startsWith(github.ref, 'refs/tags/v'))"
            )
        );
    }

    #[test]
    fn test_extra_publish_cond_is_anded() {
        let config = PipelineConfig {
            publish_cond: Some("github.repository == 'acme/widget'".to_owned()),
            ..PipelineConfig::default()
        };
        let pipeline = Pipeline::from_config(&config).unwrap();
        let cond = pipeline.publish_job().unwrap().cond.unwrap();
        assert!(cond.ends_with("&& (github.repository == 'acme/widget')"));
    }

    #[test]
    fn test_windows_prepends_fixup_steps() {
        let config = PipelineConfig {
            oses: vec!["ubuntu-latest".to_owned(), "windows-latest".to_owned()],
            ..PipelineConfig::default()
        };
        let pipeline = Pipeline::from_config(&config).unwrap();
        let job = pipeline.build_job();
        match (&job.steps[0], &job.steps[1]) {
            (
                WorkflowStep::Run { cond: first, .. },
                WorkflowStep::Run { cond: second, .. },
            ) => {
                assert_eq!(first.as_deref(), Some(WINDOWS_GUARD));
                assert_eq!(second.as_deref(), Some(WINDOWS_GUARD));
            }
            other => unreachable!("expected windows fixup steps, got {other:?}"),
        }
        assert_eq!(job.steps[2], WorkflowStep::Checkout);
    }

    #[test]
    fn test_cache_key_hashes_each_glob() {
        let pipeline = default_pipeline();
        let steps = pipeline.cache_steps();
        let WorkflowStep::Use { params, .. } = &steps[0] else {
            unreachable!("cache step is a Use step");
        };
        assert_eq!(
            params.get("key").map(String::as_str),
            Some(
                "${{ runner.os }}-sbt-cache-v2-${{ hashFiles('**/*.sbt') }}-${{ hashFiles('project/build.properties') }}"
            )
        );
        assert!(params.get("path").map(String::as_str).unwrap().contains("~/.sbt\n"));
    }

    #[test]
    fn test_download_steps_cover_every_scala_version() {
        let config = PipelineConfig {
            scalas: vec!["2.13.14".to_owned(), "3.3.3".to_owned()],
            ..PipelineConfig::default()
        };
        let pipeline = Pipeline::from_config(&config).unwrap();
        let steps = pipeline.download_steps();
        assert_eq!(steps.len(), 4);
        let WorkflowStep::Use { params, .. } = &steps[2] else {
            unreachable!("download step is a Use step");
        };
        assert_eq!(
            params.get("name").map(String::as_str),
            Some("target-${{ matrix.os }}-3.3.3-${{ matrix.java }}")
        );
    }

    #[test]
    fn test_empty_axis_is_rejected() {
        let config = PipelineConfig {
            scalas: vec![],
            ..PipelineConfig::default()
        };
        let err = Pipeline::from_config(&config).unwrap_err();
        assert!(err.to_string().contains("scalas"));
    }

    #[test]
    fn test_unknown_event_type_is_rejected() {
        let config = PipelineConfig {
            pr_event_types: vec!["opened".to_owned(), "merged".to_owned()],
            ..PipelineConfig::default()
        };
        let err = Pipeline::from_config(&config).unwrap_err();
        assert!(err.to_string().contains("merged"));
    }

    #[test]
    fn test_ambiguous_publish_ref_is_rejected() {
        let config = PipelineConfig {
            publish_refs: vec![PublishRef {
                kind: PublishRefKind::Equals,
                branch: Some("main".to_owned()),
                tag: Some("v1".to_owned()),
            }],
            ..PipelineConfig::default()
        };
        assert!(Pipeline::from_config(&config).is_err());
    }

    #[test]
    fn test_config_step_resolution() {
        let step = ConfigStep {
            name: Some("Import key".to_owned()),
            run: vec!["gpg --import key.asc".to_owned()],
            ..ConfigStep::default()
        };
        assert_eq!(
            resolve_step(&step).unwrap(),
            WorkflowStep::run(["gpg --import key.asc"]).with_name("Import key")
        );

        let step = ConfigStep {
            uses: Some("actions/setup-node@v4".to_owned()),
            ..ConfigStep::default()
        };
        assert_eq!(
            resolve_step(&step).unwrap(),
            WorkflowStep::uses("actions", "setup-node", "v4")
        );

        let step = ConfigStep {
            run: vec!["true".to_owned()],
            sbt: vec!["test".to_owned()],
            ..ConfigStep::default()
        };
        assert!(resolve_step(&step).is_err());

        let step = ConfigStep {
            uses: Some("not-an-action".to_owned()),
            ..ConfigStep::default()
        };
        assert!(resolve_step(&step).is_err());
    }

    #[test]
    fn test_extra_jobs_are_appended() {
        let pipeline = default_pipeline().with_extra_job(WorkflowJob::new(
            "coverage",
            "Coverage",
            vec![WorkflowStep::sbt(["coverage", "test"])],
        ));
        let yaml = pipeline.compile().unwrap();
        let coverage = yaml.find("  coverage:").unwrap();
        let publish = yaml.find("  publish:").unwrap();
        assert!(coverage > publish);
    }
}
