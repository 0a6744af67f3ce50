//! engine::sync
//!
//! The synchronization decision engine.
//!
//! # Design
//!
//! One [`Session`] is one run. The run always starts with a global sync
//! (fetch from the authoritative remote), then branches on the role of
//! the checked-out branch:
//!
//! ```text
//! Start -> GlobalSync -> DefaultBranchSync -> [PushFork] -> Cleanup -> Done
//!                     \-> FeatureBranchSync -> [PushFork] -> Done
//! ```
//!
//! Steps are strictly sequential; no step starts before the previous
//! runner call returns. Every mutating step waits for git's index lock
//! first. Any failure (precondition, command, lock) aborts the run
//! immediately; operations already issued are not undone.
//!
//! # Invariants
//!
//! - The default branch is resolved once per session and never
//!   re-queried, even if the repository changes concurrently.
//! - Upstream resolution is a pure function of the remote set, so the
//!   (at most two) resolutions in a run always agree.
//! - Cleanup never deletes the default branch, even when the repository
//!   reports it as merged.

use serde::Serialize;
use thiserror::Error;

use crate::core::cancel::CancelToken;
use crate::core::lock::{LockError, LockGuard, LockWait};
use crate::core::types::{BranchName, RemoteName};
use crate::git::{GitError, RepoQuery};
use crate::ui::Reporter;

use super::ops::GitOp;
use super::runner::{GitRunner, RunOutput, RunnerError};

/// Options for one sync run. Immutable for the run's duration.
#[derive(Debug, Clone, Copy)]
pub struct SyncOptions {
    /// Push the synced branch to `origin` after syncing.
    pub push: bool,
    /// Relay captured git output and dump the session summary.
    pub verbose: bool,
}

/// Errors that abort a sync run.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Expected to be on this branch, but HEAD moved since classification.
    #[error("not on the {branch} branch")]
    ExpectedBranch {
        /// The branch the step required.
        branch: BranchName,
    },

    /// Expected to be off this branch, but HEAD moved since classification.
    #[error("still on the {branch} branch")]
    UnexpectedBranch {
        /// The branch the step required to not be checked out.
        branch: BranchName,
    },

    /// An emitted git operation failed.
    #[error(transparent)]
    Command(#[from] RunnerError),

    /// Repository introspection failed.
    #[error(transparent)]
    Repo(#[from] GitError),

    /// Lock-guard failure (not a repository, or cancelled mid-wait).
    #[error(transparent)]
    Lock(#[from] LockError),
}

/// Resolve the authoritative remote from the configured remote set.
///
/// Prefers a remote literally named `upstream`; falls back to `origin`,
/// which is assumed to exist. The fallback is not validated here; a
/// missing `origin` surfaces later as a command failure, not a resolver
/// error. Pure and deterministic.
pub fn resolve_upstream(remotes: &[RemoteName]) -> RemoteName {
    if remotes.iter().any(RemoteName::is_upstream) {
        RemoteName::upstream()
    } else {
        RemoteName::origin()
    }
}

/// Classify a branch: exact, case-sensitive comparison with the default
/// branch name. No normalization.
pub fn is_default_branch(current: &BranchName, default: &BranchName) -> bool {
    current == default
}

/// Which role the checked-out branch played during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum BranchRole {
    /// The repository's default branch.
    Default,
    /// Any other branch.
    Feature,
}

/// What a completed run did. Serialized as the `--verbose` debug dump.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    /// The default branch resolved at session start.
    pub default_branch: BranchName,
    /// The authoritative remote used for the run.
    pub upstream: RemoteName,
    /// Role of the branch that was checked out.
    pub role: BranchRole,
    /// Whether a force-push to `origin` was issued.
    pub pushed: bool,
    /// Merged branches deleted during cleanup.
    pub deleted_branches: Vec<BranchName>,
}

/// One sync run's context: options plus the default branch resolved at
/// construction time. Created at the start of a run, discarded at the
/// end; never shared across runs.
pub struct Session<'a> {
    opts: SyncOptions,
    default_branch: BranchName,
    repo: &'a dyn RepoQuery,
    runner: &'a dyn GitRunner,
    lock: &'a LockGuard,
    cancel: &'a CancelToken,
    out: &'a Reporter,
}

impl<'a> Session<'a> {
    /// Build a session, resolving the default branch once.
    ///
    /// # Errors
    ///
    /// [`SyncError::Repo`] when the default branch cannot be determined.
    pub fn new(
        opts: SyncOptions,
        repo: &'a dyn RepoQuery,
        runner: &'a dyn GitRunner,
        lock: &'a LockGuard,
        cancel: &'a CancelToken,
        out: &'a Reporter,
    ) -> Result<Self, SyncError> {
        let default_branch = repo.default_branch()?;
        Ok(Self {
            opts,
            default_branch,
            repo,
            runner,
            lock,
            cancel,
            out,
        })
    }

    /// The default branch this session resolved at construction.
    pub fn default_branch(&self) -> &BranchName {
        &self.default_branch
    }

    /// Run the full sync sequence.
    pub fn run(&self) -> Result<RunSummary, SyncError> {
        self.sync_global()?;

        let current = self.repo.current_branch()?;
        if is_default_branch(&current, &self.default_branch) {
            self.sync_default_branch()
        } else {
            self.sync_feature_branch()
        }
    }

    /// Global sync: fetch from the authoritative remote, and keep the
    /// default branch ref current when it is not checked out.
    fn sync_global(&self) -> Result<(), SyncError> {
        let upstream = self.upstream_remote()?;

        self.out.plain(format!("main: {}", self.default_branch));
        self.out.plain(format!("upstream: {upstream}"));

        self.wait_for_lock()?;
        self.emit(&GitOp::Fetch {
            remote: upstream.clone(),
            prune: true,
            prune_tags: true,
        })?;

        if !self.repo.is_current_branch(&self.default_branch)? {
            self.out.info(format!(
                "{branch} <= {remote}/{branch}",
                remote = self.out.remote(&upstream),
                branch = self.out.branch(&self.default_branch),
            ));
            self.emit(&GitOp::FetchRefUpdate {
                remote: upstream,
                branch: self.default_branch.clone(),
            })?;
        }

        Ok(())
    }

    /// Default-branch sync: mirror upstream, optionally refresh the
    /// fork, then delete merged branches.
    fn sync_default_branch(&self) -> Result<RunSummary, SyncError> {
        let upstream = self.upstream_remote()?;

        self.assert_on(&self.default_branch)?;
        self.reset_to_remote(&upstream)?;

        // Update the fork only in a fork topology: the resolved remote
        // must literally be `upstream`, and `origin` must exist.
        let mut pushed = false;
        if self.opts.push && upstream.is_upstream() && self.repo.remote_exists("origin")? {
            self.push_origin()?;
            pushed = true;
        }

        let deleted_branches = self.cleanup_merged_branches()?;

        Ok(RunSummary {
            default_branch: self.default_branch.clone(),
            upstream,
            role: BranchRole::Default,
            pushed,
            deleted_branches,
        })
    }

    /// Feature-branch sync: rebase onto the upstream counterpart,
    /// optionally refresh the fork.
    fn sync_feature_branch(&self) -> Result<RunSummary, SyncError> {
        let upstream = self.upstream_remote()?;

        self.assert_off(&self.default_branch)?;
        self.pull_rebase(&upstream)?;

        let mut pushed = false;
        if self.opts.push {
            self.push_origin()?;
            pushed = true;
        }

        Ok(RunSummary {
            default_branch: self.default_branch.clone(),
            upstream,
            role: BranchRole::Feature,
            pushed,
            deleted_branches: Vec::new(),
        })
    }

    fn reset_to_remote(&self, upstream: &RemoteName) -> Result<(), SyncError> {
        self.wait_for_lock()?;
        self.out.info(format!(
            "<= {}/{}",
            self.out.remote(upstream),
            self.out.branch(&self.default_branch),
        ));
        self.emit(&GitOp::ResetHard {
            remote: upstream.clone(),
            branch: self.default_branch.clone(),
        })?;
        Ok(())
    }

    fn pull_rebase(&self, upstream: &RemoteName) -> Result<(), SyncError> {
        let branch = self.repo.current_branch()?;

        self.wait_for_lock()?;
        self.out.info(format!(
            "<= {}/{}",
            self.out.remote(upstream),
            self.out.branch(&branch),
        ));
        self.emit(&GitOp::PullRebase {
            remote: upstream.clone(),
            branch,
        })?;
        Ok(())
    }

    fn push_origin(&self) -> Result<(), SyncError> {
        let branch = self.repo.current_branch()?;
        let origin = RemoteName::origin();

        self.wait_for_lock()?;
        self.out.info(format!(
            "=> {}/{}",
            self.out.remote(&origin),
            self.out.branch(&branch),
        ));
        self.emit(&GitOp::PushForce {
            remote: origin,
            branch,
        })?;
        Ok(())
    }

    fn cleanup_merged_branches(&self) -> Result<Vec<BranchName>, SyncError> {
        self.out.info("Clean up");
        self.wait_for_lock()?;

        let mut deleted = Vec::new();
        for branch in self.repo.merged_branches()? {
            if branch == self.default_branch {
                continue;
            }
            self.emit(&GitOp::DeleteBranch {
                branch: branch.clone(),
            })?;
            deleted.push(branch);
        }

        Ok(deleted)
    }

    /// Upstream resolution for this run; pure given the remote set, so
    /// repeated calls within a run agree.
    fn upstream_remote(&self) -> Result<RemoteName, SyncError> {
        Ok(resolve_upstream(&self.repo.remotes()?))
    }

    /// Echo and execute one operation; relay output in verbose mode.
    fn emit(&self, op: &GitOp) -> Result<RunOutput, SyncError> {
        self.out.command(op);
        let output = self.runner.run(op)?;
        if self.opts.verbose {
            self.out.output_block(&output.stdout);
            self.out.output_block(&output.stderr);
        }
        Ok(output)
    }

    /// Block until git's index lock clears, rendering progress.
    fn wait_for_lock(&self) -> Result<(), SyncError> {
        let outcome = self.lock.wait(self.cancel, |attempt| {
            self.out.lock_waiting(attempt);
        })?;
        if matches!(outcome, LockWait::Waited { .. }) {
            self.out.lock_wait_done();
        }
        Ok(())
    }

    fn assert_on(&self, branch: &BranchName) -> Result<(), SyncError> {
        if !self.repo.is_current_branch(branch)? {
            return Err(SyncError::ExpectedBranch {
                branch: branch.clone(),
            });
        }
        Ok(())
    }

    fn assert_off(&self, branch: &BranchName) -> Result<(), SyncError> {
        if self.repo.is_current_branch(branch)? {
            return Err(SyncError::UnexpectedBranch {
                branch: branch.clone(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn remotes(names: &[&str]) -> Vec<RemoteName> {
        names.iter().map(|n| RemoteName::new(*n).unwrap()).collect()
    }

    mod upstream_resolution {
        use super::*;

        #[test]
        fn prefers_literal_upstream() {
            for set in [
                vec!["upstream"],
                vec!["origin", "upstream"],
                vec!["upstream", "origin", "fork2"],
            ] {
                assert!(resolve_upstream(&remotes(&set)).is_upstream());
            }
        }

        #[test]
        fn falls_back_to_origin() {
            for set in [vec![], vec!["origin"], vec!["origin", "fork2"]] {
                assert_eq!(resolve_upstream(&remotes(&set)), RemoteName::origin());
            }
        }

        #[test]
        fn resolution_is_deterministic() {
            let set = remotes(&["origin", "upstream"]);
            assert_eq!(resolve_upstream(&set), resolve_upstream(&set));
        }

        #[test]
        fn no_fuzzy_matching() {
            // Differently-cased or prefixed names never count as upstream.
            let set = remotes(&["Upstream", "upstream2", "origin"]);
            assert_eq!(resolve_upstream(&set), RemoteName::origin());
        }
    }

    mod branch_classification {
        use super::*;

        #[test]
        fn same_name_is_default() {
            for name in ["main", "master", "develop", "feature/x"] {
                let b = BranchName::new(name).unwrap();
                assert!(is_default_branch(&b, &b.clone()));
            }
        }

        #[test]
        fn different_name_is_feature() {
            let main = BranchName::new("main").unwrap();
            let feature = BranchName::new("feature-x").unwrap();
            assert!(!is_default_branch(&feature, &main));
        }

        #[test]
        fn comparison_is_case_sensitive() {
            let main = BranchName::new("main").unwrap();
            let upper = BranchName::new("Main").unwrap();
            assert!(!is_default_branch(&upper, &main));
        }
    }

    mod errors {
        use super::*;

        #[test]
        fn branch_assertions_name_the_branch() {
            let main = BranchName::new("main").unwrap();
            let err = SyncError::ExpectedBranch {
                branch: main.clone(),
            };
            assert_eq!(err.to_string(), "not on the main branch");

            let err = SyncError::UnexpectedBranch { branch: main };
            assert_eq!(err.to_string(), "still on the main branch");
        }
    }
}
