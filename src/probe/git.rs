//! Git probe implementation
//!
//! Runs `git rev-parse --absolute-git-dir` inside the working directory.
//! For a worktree of `/home/u/repo` git answers `/home/u/repo/.git/worktrees/<name>`.

use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use super::{AncestryProbe, ProbeError};

const POLL_INTERVAL: Duration = Duration::from_millis(10);

pub struct GitProbe {
    git_binary: PathBuf,
    timeout: Duration,
}

impl GitProbe {
    pub fn new(git_binary: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            git_binary: git_binary.into(),
            timeout,
        }
    }

    fn run(&self, cmd: &mut Command) -> Result<Output, ProbeError> {
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::null());
        let mut child = cmd.spawn()?;
        let started = Instant::now();
        loop {
            if child.try_wait()?.is_some() {
                return Ok(child.wait_with_output()?);
            }
            if started.elapsed() >= self.timeout {
                let _ = child.kill();
                let _ = child.wait();
                return Err(ProbeError::Timeout(self.timeout));
            }
            thread::sleep(POLL_INTERVAL);
        }
    }
}

impl Default for GitProbe {
    fn default() -> Self {
        Self::new("git", Duration::from_millis(3000))
    }
}

impl AncestryProbe for GitProbe {
    fn name(&self) -> &str {
        "git"
    }

    fn git_dir(&self, working_dir: &Path) -> Result<String, ProbeError> {
        let mut cmd = Command::new(&self.git_binary);
        cmd.args(["rev-parse", "--absolute-git-dir"])
            .current_dir(working_dir);

        let output = self.run(&mut cmd)?;
        if !output.status.success() {
            return Err(ProbeError::Failed(output.status));
        }

        let stdout = String::from_utf8(output.stdout)
            .map_err(|e| ProbeError::Output(e.to_string()))?;
        let git_dir = stdout.trim();
        if git_dir.is_empty() {
            return Err(ProbeError::Output("empty output".to_string()));
        }
        Ok(git_dir.to_string())
    }
}
