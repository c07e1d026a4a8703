//! Model-to-text compilers.
//!
//! Pure functions mapping each model entity to its textual fragment. Each
//! compiler composes the primitives in [`crate::yaml`] and recurses into
//! its children; nothing here performs I/O.

use crate::schema::{PrEventType, Ref, RefPredicate, WorkflowJob, WorkflowStep};
use crate::yaml::{compile_flow_list, compile_list, indent, is_safe_string, wrap};
use forgeci_core::{Error, Result};
use indexmap::IndexMap;

/// Warning comment at the top of every generated workflow file.
pub const GENERATED_HEADER: &str = "\
# This file was automatically generated by forgeci.
#
# You should add and commit this file to your git repository, but do not
# edit it by hand! Instead, change the pipeline description in forgeci.toml
# and run `forgeci generate` to regenerate this file.";

/// Renders a reference as its fully-qualified form.
#[must_use]
pub fn compile_ref(git_ref: &Ref) -> String {
    format!("{}{}", git_ref.prefix(), git_ref.name())
}

/// Renders a predicate as a boolean expression over `target`.
///
/// `Contains` and `EndsWith` additionally assert the reference type with a
/// `startsWith` guard: the raw comparison target is a prefixed
/// full-reference string, so a bare `contains`/`endsWith` would
/// false-positive across branch/tag types.
#[must_use]
pub fn compile_branch_predicate(target: &str, pred: &RefPredicate) -> String {
    match pred {
        RefPredicate::Equals(r) => format!("{target} == '{}'", compile_ref(r)),
        RefPredicate::Contains(r) => format!(
            "(startsWith({target}, '{}') && contains({target}, '{}'))",
            r.prefix(),
            r.name()
        ),
        RefPredicate::StartsWith(r) => format!("startsWith({target}, '{}')", compile_ref(r)),
        RefPredicate::EndsWith(r) => format!(
            "(startsWith({target}, '{}') && endsWith({target}, '{}'))",
            r.prefix(),
            r.name()
        ),
    }
}

/// The canonical lower-snake-case name of a pull request event type.
#[must_use]
pub fn compile_pr_event_type(tpe: PrEventType) -> &'static str {
    match tpe {
        PrEventType::Assigned => "assigned",
        PrEventType::Unassigned => "unassigned",
        PrEventType::Labeled => "labeled",
        PrEventType::Unlabeled => "unlabeled",
        PrEventType::Opened => "opened",
        PrEventType::Edited => "edited",
        PrEventType::Closed => "closed",
        PrEventType::Reopened => "reopened",
        PrEventType::Synchronize => "synchronize",
        PrEventType::ReadyForReview => "ready_for_review",
        PrEventType::Locked => "locked",
        PrEventType::Unlocked => "unlocked",
        PrEventType::ReviewRequested => "review_requested",
        PrEventType::ReviewRequestRemoved => "review_request_removed",
    }
}

/// Renders an environment mapping headed by `prefix:`, or an empty string
/// for an empty mapping.
///
/// # Errors
///
/// Returns [`Error::InvalidEnvKey`] for a key containing a space or any
/// character disallowed by [`is_safe_string`].
pub fn compile_env(env: &IndexMap<String, String>, prefix: &str) -> Result<String> {
    if env.is_empty() {
        return Ok(String::new());
    }
    let mut rendered = Vec::with_capacity(env.len());
    for (key, value) in env {
        if !is_safe_string(key) || key.contains(' ') {
            return Err(Error::invalid_env_key(key));
        }
        rendered.push(format!("{key}: {}", wrap(value)));
    }
    Ok(format!("{prefix}:\n{}", indent(&rendered.join("\n"), 1)))
}

/// Renders a step as a sequence item.
///
/// The fragment is indented one level and its first character forced to
/// `-`. `declare_shell` adds a `shell: bash` line to command bodies, needed
/// when any job OS is a Windows variant.
pub fn compile_step(step: &WorkflowStep, sbt: &str, declare_shell: bool) -> Result<String> {
    let shell = if declare_shell { "shell: bash\n" } else { "" };

    let (name, id, cond, env, body) = match step {
        WorkflowStep::Checkout => {
            return compile_step(&WorkflowStep::checkout_full(), sbt, declare_shell);
        }
        WorkflowStep::SetupScala => {
            return compile_step(&WorkflowStep::setup_scala_full(), sbt, declare_shell);
        }
        WorkflowStep::Run {
            commands,
            name,
            id,
            cond,
            env,
        } => {
            let body = format!("{shell}run: {}", wrap(&commands.join("\n")));
            (name, id, cond, env, body)
        }
        WorkflowStep::Sbt {
            commands,
            name,
            id,
            cond,
            env,
        } => {
            let quoted: Vec<String> = commands
                .iter()
                .map(|command| {
                    if command.contains(' ') {
                        format!("'{command}'")
                    } else {
                        command.clone()
                    }
                })
                .collect();
            let invocation = format!("{sbt} ++${{{{ matrix.scala }}}} {}", quoted.join(" "));
            let body = format!("{shell}run: {}", wrap(&invocation));
            (name, id, cond, env, body)
        }
        WorkflowStep::Use {
            owner,
            repo,
            git_ref,
            params,
            name,
            id,
            cond,
            env,
        } => {
            let mut body = format!("uses: {owner}/{repo}@{git_ref}");
            let with = compile_env(params, "with")?;
            if !with.is_empty() {
                body.push('\n');
                body.push_str(&with);
            }
            (name, id, cond, env, body)
        }
    };

    let mut fragment = String::new();
    if let Some(name) = name {
        fragment.push_str(&format!("name: {}\n", wrap(name)));
    }
    if let Some(id) = id {
        fragment.push_str(&format!("id: {}\n", wrap(id)));
    }
    if let Some(cond) = cond {
        fragment.push_str(&format!("if: {}\n", wrap(cond)));
    }
    let rendered_env = compile_env(env, "env")?;
    if !rendered_env.is_empty() {
        fragment.push_str(&rendered_env);
        fragment.push('\n');
    }
    fragment.push_str(&body);

    let indented = indent(&fragment, 1);
    Ok(format!("-{}", &indented[1..]))
}

/// Renders a job, keyed by its id, with its matrix and steps.
///
/// A `shell: bash` declaration is forced onto every command step when any
/// OS in the matrix is a Windows variant.
pub fn compile_job(job: &WorkflowJob, sbt: &str) -> Result<String> {
    let rendered_needs = if job.needs.is_empty() {
        String::new()
    } else {
        format!("\nneeds: [{}]", job.needs.join(", "))
    };
    let rendered_cond = match &job.cond {
        Some(cond) => format!("\nif: {}", wrap(cond)),
        None => String::new(),
    };
    let rendered_env = {
        let rendered = compile_env(&job.env, "env")?;
        if rendered.is_empty() {
            String::new()
        } else {
            format!("\n{rendered}")
        }
    };

    let declare_shell = job.oses.iter().any(|os| os.contains("windows"));

    let mut matrix = vec![
        format!("os: {}", compile_flow_list(&job.oses)),
        format!("scala: {}", compile_flow_list(&job.scalas)),
        format!("java: {}", compile_flow_list(&job.javas)),
    ];
    for (axis, values) in &job.matrix_adds {
        matrix.push(format!("{axis}: {}", compile_flow_list(values)));
    }

    let steps = job
        .steps
        .iter()
        .map(|step| compile_step(step, sbt, declare_shell))
        .collect::<Result<Vec<_>>>()?
        .join("\n\n");

    let body = format!(
        "name: {}{rendered_needs}{rendered_cond}\nstrategy:\n  matrix:\n{}\nruns-on: ${{{{ matrix.os }}}}{rendered_env}\nsteps:\n{}",
        wrap(&job.name),
        indent(&matrix.join("\n"), 2),
        indent(&steps, 1),
    );

    Ok(format!("{}:\n{}", job.id, indent(&body, 1)))
}

/// Renders the complete workflow document, including the generated-file
/// header and a trailing newline.
///
/// The `types:` clause is emitted only when `pr_event_types` differs from
/// the canonical default set, compared order-independently.
pub fn compile_workflow(
    name: &str,
    branches: &[String],
    pr_event_types: &[PrEventType],
    env: &IndexMap<String, String>,
    jobs: &[WorkflowJob],
    sbt: &str,
) -> Result<String> {
    let rendered_types = if is_default_event_set(pr_event_types) {
        String::new()
    } else {
        let names: Vec<String> = pr_event_types
            .iter()
            .map(|tpe| compile_pr_event_type(*tpe).to_owned())
            .collect();
        format!(
            "\n{}",
            indent(&format!("types:\n{}", compile_list(&names, 1)), 2)
        )
    };

    let rendered_env = {
        let rendered = compile_env(env, "env")?;
        if rendered.is_empty() {
            String::new()
        } else {
            format!("\n{rendered}\n")
        }
    };

    let rendered_jobs = jobs
        .iter()
        .map(|job| compile_job(job, sbt))
        .collect::<Result<Vec<_>>>()?
        .join("\n\n");

    Ok(format!(
        "{GENERATED_HEADER}\n\nname: {}\n\non:\n  pull_request:\n    branches:\n{}{rendered_types}\n  push:\n    branches:\n{}\n{rendered_env}\njobs:\n{}\n",
        wrap(name),
        compile_list(branches, 3),
        compile_list(branches, 3),
        indent(&rendered_jobs, 1),
    ))
}

fn is_default_event_set(pr_event_types: &[PrEventType]) -> bool {
    let mut given: Vec<PrEventType> = pr_event_types.to_vec();
    let mut defaults: Vec<PrEventType> = PrEventType::DEFAULTS.to_vec();
    given.sort_unstable();
    given.dedup();
    defaults.sort_unstable();
    given == defaults
}
