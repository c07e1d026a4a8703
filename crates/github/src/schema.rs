//! Workflow domain model.
//!
//! Immutable value objects describing the pipeline: references and
//! predicates over them, pull request trigger events, steps, and jobs.
//! The compiler in [`crate::emitter`] consumes these by reference and
//! never mutates them.

use indexmap::IndexMap;

/// A version-control reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ref {
    /// A branch name, without the `refs/heads/` prefix.
    Branch(String),
    /// A tag name, without the `refs/tags/` prefix.
    Tag(String),
}

impl Ref {
    /// The fully-qualified prefix for this reference type.
    #[must_use]
    pub fn prefix(&self) -> &'static str {
        match self {
            Ref::Branch(_) => "refs/heads/",
            Ref::Tag(_) => "refs/tags/",
        }
    }

    /// The bare reference name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Ref::Branch(name) | Ref::Tag(name) => name,
        }
    }
}

/// A condition over a reference target, used to gate publish jobs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefPredicate {
    /// The target equals the fully-qualified reference.
    Equals(Ref),
    /// The target contains the reference name (guarded by reference type).
    Contains(Ref),
    /// The target starts with the fully-qualified reference.
    StartsWith(Ref),
    /// The target ends with the reference name (guarded by reference type).
    EndsWith(Ref),
}

/// Pull request activity types that can trigger a workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[allow(missing_docs)]
pub enum PrEventType {
    Assigned,
    Unassigned,
    Labeled,
    Unlabeled,
    Opened,
    Edited,
    Closed,
    Reopened,
    Synchronize,
    ReadyForReview,
    Locked,
    Unlocked,
    ReviewRequested,
    ReviewRequestRemoved,
}

impl PrEventType {
    /// The activity types GitHub applies when no `types:` clause is given.
    pub const DEFAULTS: &'static [PrEventType] = &[
        PrEventType::Opened,
        PrEventType::Reopened,
        PrEventType::Synchronize,
    ];

    /// All fourteen activity types.
    pub const ALL: &'static [PrEventType] = &[
        PrEventType::Assigned,
        PrEventType::Unassigned,
        PrEventType::Labeled,
        PrEventType::Unlabeled,
        PrEventType::Opened,
        PrEventType::Edited,
        PrEventType::Closed,
        PrEventType::Reopened,
        PrEventType::Synchronize,
        PrEventType::ReadyForReview,
        PrEventType::Locked,
        PrEventType::Unlocked,
        PrEventType::ReviewRequested,
        PrEventType::ReviewRequestRemoved,
    ];

    /// Parses a canonical lower-snake-case event name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "assigned" => Some(Self::Assigned),
            "unassigned" => Some(Self::Unassigned),
            "labeled" => Some(Self::Labeled),
            "unlabeled" => Some(Self::Unlabeled),
            "opened" => Some(Self::Opened),
            "edited" => Some(Self::Edited),
            "closed" => Some(Self::Closed),
            "reopened" => Some(Self::Reopened),
            "synchronize" => Some(Self::Synchronize),
            "ready_for_review" => Some(Self::ReadyForReview),
            "locked" => Some(Self::Locked),
            "unlocked" => Some(Self::Unlocked),
            "review_requested" => Some(Self::ReviewRequested),
            "review_request_removed" => Some(Self::ReviewRequestRemoved),
            _ => None,
        }
    }
}

/// A single action within a job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowStep {
    /// Executes a shell command block.
    Run {
        /// Commands, joined by newlines into one `run:` scalar.
        commands: Vec<String>,
        /// Step display name.
        name: Option<String>,
        /// Identifier for referencing step outputs.
        id: Option<String>,
        /// Conditional execution expression.
        cond: Option<String>,
        /// Step-level environment variables.
        env: IndexMap<String, String>,
    },
    /// Executes the configured sbt invocation with a list of sbt commands.
    Sbt {
        /// sbt commands; any containing whitespace is individually quoted.
        commands: Vec<String>,
        /// Step display name.
        name: Option<String>,
        /// Identifier for referencing step outputs.
        id: Option<String>,
        /// Conditional execution expression.
        cond: Option<String>,
        /// Step-level environment variables.
        env: IndexMap<String, String>,
    },
    /// Invokes a reusable action addressed by owner/repo/ref.
    Use {
        /// Action owner.
        owner: String,
        /// Action repository.
        repo: String,
        /// Action reference (tag, branch, or commit).
        git_ref: String,
        /// Keyword parameters rendered into the `with:` block.
        params: IndexMap<String, String>,
        /// Step display name.
        name: Option<String>,
        /// Identifier for referencing step outputs.
        id: Option<String>,
        /// Conditional execution expression.
        cond: Option<String>,
        /// Step-level environment variables.
        env: IndexMap<String, String>,
    },
    /// Canonical source checkout step with a fixed expansion.
    Checkout,
    /// Canonical Java/Scala runtime setup step with a fixed expansion.
    SetupScala,
}

impl WorkflowStep {
    /// Create a step that runs shell commands.
    pub fn run<I, S>(commands: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Run {
            commands: commands.into_iter().map(Into::into).collect(),
            name: None,
            id: None,
            cond: None,
            env: IndexMap::new(),
        }
    }

    /// Create a step that runs sbt commands.
    pub fn sbt<I, S>(commands: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Sbt {
            commands: commands.into_iter().map(Into::into).collect(),
            name: None,
            id: None,
            cond: None,
            env: IndexMap::new(),
        }
    }

    /// Create a step that uses a reusable action.
    pub fn uses(
        owner: impl Into<String>,
        repo: impl Into<String>,
        git_ref: impl Into<String>,
    ) -> Self {
        Self::Use {
            owner: owner.into(),
            repo: repo.into(),
            git_ref: git_ref.into(),
            params: IndexMap::new(),
            name: None,
            id: None,
            cond: None,
            env: IndexMap::new(),
        }
    }

    /// Set the step name. No-op on the canonical fixed steps.
    #[must_use]
    pub fn with_name(mut self, value: impl Into<String>) -> Self {
        if let Self::Run { name, .. } | Self::Sbt { name, .. } | Self::Use { name, .. } =
            &mut self
        {
            *name = Some(value.into());
        }
        self
    }

    /// Set the step id. No-op on the canonical fixed steps.
    #[must_use]
    pub fn with_id(mut self, value: impl Into<String>) -> Self {
        if let Self::Run { id, .. } | Self::Sbt { id, .. } | Self::Use { id, .. } = &mut self {
            *id = Some(value.into());
        }
        self
    }

    /// Set the step condition. No-op on the canonical fixed steps.
    #[must_use]
    pub fn with_cond(mut self, value: impl Into<String>) -> Self {
        if let Self::Run { cond, .. } | Self::Sbt { cond, .. } | Self::Use { cond, .. } =
            &mut self
        {
            *cond = Some(value.into());
        }
        self
    }

    /// Add a step-level environment variable. No-op on the canonical steps.
    #[must_use]
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        if let Self::Run { env, .. } | Self::Sbt { env, .. } | Self::Use { env, .. } = &mut self
        {
            env.insert(key.into(), value.into());
        }
        self
    }

    /// Add a keyword parameter. No-op on anything but `Use` steps.
    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        if let Self::Use { params, .. } = &mut self {
            params.insert(key.into(), value.into());
        }
        self
    }

    /// The fixed expansion of [`WorkflowStep::Checkout`].
    #[must_use]
    pub fn checkout_full() -> Self {
        Self::uses("actions", "checkout", "v4")
            .with_name("Checkout current branch (full)")
            .with_param("fetch-depth", "0")
    }

    /// The fixed expansion of [`WorkflowStep::SetupScala`].
    #[must_use]
    pub fn setup_scala_full() -> Self {
        Self::uses("olafurpg", "setup-scala", "v14")
            .with_name("Setup Java and Scala")
            .with_param("java-version", "${{ matrix.java }}")
    }
}

/// A named unit of work, run under a matrix of environment axes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowJob {
    /// Job key in the `jobs:` mapping.
    pub id: String,
    /// Job display name.
    pub name: String,
    /// Steps, executed sequentially.
    pub steps: Vec<WorkflowStep>,
    /// Conditional execution expression.
    pub cond: Option<String>,
    /// Job-level environment variables.
    pub env: IndexMap<String, String>,
    /// Runner OS matrix axis. Must not be empty.
    pub oses: Vec<String>,
    /// Scala version matrix axis. Must not be empty.
    pub scalas: Vec<String>,
    /// Java version matrix axis. Must not be empty.
    pub javas: Vec<String>,
    /// Additional matrix axes.
    pub matrix_adds: IndexMap<String, Vec<String>>,
    /// Ids of jobs that must complete first.
    pub needs: Vec<String>,
}

impl WorkflowJob {
    /// Create a job with default single-value matrix axes.
    pub fn new(id: impl Into<String>, name: impl Into<String>, steps: Vec<WorkflowStep>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            steps,
            cond: None,
            env: IndexMap::new(),
            oses: vec!["ubuntu-latest".to_owned()],
            scalas: vec!["2.13.14".to_owned()],
            javas: vec!["adopt@1.11".to_owned()],
            matrix_adds: IndexMap::new(),
            needs: Vec::new(),
        }
    }

    /// Set the job condition.
    #[must_use]
    pub fn with_cond(mut self, cond: impl Into<String>) -> Self {
        self.cond = Some(cond.into());
        self
    }

    /// Replace the OS matrix axis.
    #[must_use]
    pub fn with_oses(mut self, oses: Vec<String>) -> Self {
        self.oses = oses;
        self
    }

    /// Replace the Scala matrix axis.
    #[must_use]
    pub fn with_scalas(mut self, scalas: Vec<String>) -> Self {
        self.scalas = scalas;
        self
    }

    /// Replace the Java matrix axis.
    #[must_use]
    pub fn with_javas(mut self, javas: Vec<String>) -> Self {
        self.javas = javas;
        self
    }

    /// Replace the extra matrix axes.
    #[must_use]
    pub fn with_matrix_adds(mut self, matrix_adds: IndexMap<String, Vec<String>>) -> Self {
        self.matrix_adds = matrix_adds;
        self
    }

    /// Replace the job dependencies.
    #[must_use]
    pub fn with_needs<I, S>(mut self, needs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.needs = needs.into_iter().map(Into::into).collect();
        self
    }

    /// Add a job-level environment variable.
    #[must_use]
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }
}
