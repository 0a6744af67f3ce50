//! engine::runner
//!
//! Executes logical git operations by invoking the `git` binary.
//!
//! The engine consumes the [`GitRunner`] trait; [`ShellRunner`] is the
//! production implementation. A failed operation is terminal for the
//! run: there is no retry tier, and callers must not continue the
//! sequence after an error.

use std::path::PathBuf;
use std::process::Command;

use thiserror::Error;

use super::ops::GitOp;

/// Captured output of a successful operation.
#[derive(Debug, Clone, Default)]
pub struct RunOutput {
    /// Captured stdout.
    pub stdout: String,
    /// Captured stderr. Git writes progress here even on success.
    pub stderr: String,
}

/// Errors from executing a git operation.
#[derive(Debug, Error)]
pub enum RunnerError {
    /// The `git` binary could not be spawned at all.
    #[error("cannot run `{command}`: {source}")]
    Spawn {
        /// The command line that failed to start.
        command: String,
        source: std::io::Error,
    },

    /// The operation ran and exited unsuccessfully.
    #[error("`{command}` failed: {output}")]
    Failed {
        /// The command line that failed.
        command: String,
        /// Trimmed stderr (or stdout when stderr is empty).
        output: String,
    },
}

/// Executes a logical git operation.
pub trait GitRunner {
    /// Run one operation to completion, capturing its output.
    ///
    /// # Errors
    ///
    /// [`RunnerError::Failed`] when git exits non-zero; the error carries
    /// the captured output for reporting.
    fn run(&self, op: &GitOp) -> Result<RunOutput, RunnerError>;
}

/// Runs operations through the real `git` binary.
#[derive(Debug, Clone)]
pub struct ShellRunner {
    workdir: PathBuf,
}

impl ShellRunner {
    /// Create a runner that executes git inside `workdir`.
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Self {
            workdir: workdir.into(),
        }
    }
}

impl GitRunner for ShellRunner {
    fn run(&self, op: &GitOp) -> Result<RunOutput, RunnerError> {
        let output = Command::new("git")
            .args(op.argv())
            .current_dir(&self.workdir)
            .output()
            .map_err(|source| RunnerError::Spawn {
                command: op.to_string(),
                source,
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if !output.status.success() {
            let detail = if stderr.trim().is_empty() {
                stdout.trim().to_string()
            } else {
                stderr.trim().to_string()
            };
            return Err(RunnerError::Failed {
                command: op.to_string(),
                output: detail,
            });
        }

        Ok(RunOutput { stdout, stderr })
    }
}
