//! Generate/check driver.
//!
//! The only component with side effects: writes the two workflow files
//! under `.github/workflows/`, or verifies the committed files against
//! freshly compiled text. Each artifact is fully computed in memory
//! before it is written; there is no partial-write state.

use crate::pipeline::Pipeline;
use forgeci_core::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// The clean-up workflow written verbatim next to the compiled pipeline.
const CLEAN_TEMPLATE: &str = include_str!("../templates/clean.yml");

/// Compiled pipeline file name.
pub const CI_FILE: &str = "ci.yml";
/// Static clean-up workflow file name.
pub const CLEAN_FILE: &str = "clean.yml";

/// The workflow directory for a project root.
#[must_use]
pub fn workflows_dir(root: &Path) -> PathBuf {
    root.join(".github").join("workflows")
}

/// Compile the pipeline and overwrite both workflow files, creating the
/// workflow directory first if needed.
///
/// # Errors
///
/// Propagates compile errors and I/O failures with path context.
pub fn generate(root: &Path, pipeline: &Pipeline) -> Result<()> {
    let compiled = pipeline.compile()?;
    let dir = workflows_dir(root);
    fs::create_dir_all(&dir).map_err(|e| Error::io(dir.clone(), e))?;
    write_file(&dir.join(CI_FILE), &compiled)?;
    write_file(&dir.join(CLEAN_FILE), CLEAN_TEMPLATE)?;
    info!(dir = %dir.display(), "generated workflow files");
    Ok(())
}

/// Recompile the pipeline and compare both workflow files byte-for-byte
/// against the files on disk.
///
/// # Errors
///
/// Returns [`Error::StaleWorkflow`] naming the first mismatching file, or
/// an I/O error when a file cannot be read (including when it is missing).
pub fn check(root: &Path, pipeline: &Pipeline) -> Result<()> {
    let compiled = pipeline.compile()?;
    let dir = workflows_dir(root);
    check_file(&dir.join(CI_FILE), &compiled)?;
    check_file(&dir.join(CLEAN_FILE), CLEAN_TEMPLATE)?;
    info!(dir = %dir.display(), "workflow files are up to date");
    Ok(())
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    debug!(path = %path.display(), bytes = contents.len(), "writing workflow file");
    fs::write(path, contents).map_err(|e| Error::io(path, e))
}

fn check_file(path: &Path, expected: &str) -> Result<()> {
    let actual = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    if actual == expected {
        debug!(path = %path.display(), "workflow file matches");
        Ok(())
    } else {
        Err(Error::stale_workflow(path))
    }
}
