//! Ancestry probe trait
//!
//! A probe asks the version-control system which git directory backs a working
//! directory. Parallel working trees report a git directory nested under the
//! main checkout's `.git/worktrees/`, which is how the resolver finds the
//! repository a worktree belongs to.
//!
//! Probe Implementations:
//! - GitProbe: runs `git rev-parse --absolute-git-dir`, bounded by a timeout

mod git;

pub use git::GitProbe;

use std::path::Path;
use std::time::Duration;

use thiserror::Error;

/// Why a probe produced no answer. Callers treat every variant the same way.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("failed to launch probe: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("probe timed out after {0:?}")]
    Timeout(Duration),

    #[error("probe exited with {0}")]
    Failed(std::process::ExitStatus),

    #[error("probe returned unusable output: {0}")]
    Output(String),
}

/// Working-directory-scoped ancestry lookup
pub trait AncestryProbe: Send + Sync {
    /// Short name for log output
    fn name(&self) -> &str;

    /// Absolute git directory backing `working_dir`
    fn git_dir(&self, working_dir: &Path) -> Result<String, ProbeError>;
}
