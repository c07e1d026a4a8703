//! GitHub Actions workflow compiler.
//!
//! Compiles an in-memory pipeline model into the exact text of a workflow
//! file and verifies previously written files against it. The document is
//! rendered by hand rather than through a YAML serializer: `forgeci check`
//! compares byte-for-byte, so quoting, indentation, and blank-line
//! placement are part of the observable contract.
//!
//! Data flows one way, model → compiler → text. Only [`sync`] touches the
//! filesystem; everything else is a pure function from immutable inputs to
//! a string.
//!
//! # Example
//!
//! ```
//! use forgeci_core::PipelineConfig;
//! use forgeci_github::pipeline::Pipeline;
//!
//! let pipeline = Pipeline::from_config(&PipelineConfig::default()).unwrap();
//! let yaml = pipeline.compile().unwrap();
//! assert!(yaml.contains("runs-on: ${{ matrix.os }}"));
//! ```

pub mod emitter;
pub mod pipeline;
pub mod schema;
pub mod sync;
pub mod yaml;

pub use pipeline::Pipeline;
pub use schema::{PrEventType, Ref, RefPredicate, WorkflowJob, WorkflowStep};
