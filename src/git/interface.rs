//! git::interface
//!
//! Repository introspection via git2.
//!
//! This module is the single doorway to libgit2: no other module imports
//! `git2`. The sync engine consumes it through the [`RepoQuery`] trait so
//! tests can substitute a scripted repository.
//!
//! Introspection is read-only. Everything that mutates the repository
//! goes through the command runner instead ([`crate::engine::runner`]),
//! because operations like fetch and rebase belong to the real `git`
//! binary, not to an in-process reimplementation.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::core::types::{BranchName, RemoteName};

/// Errors from repository introspection.
#[derive(Debug, Error)]
pub enum GitError {
    /// Not inside a git repository.
    #[error("not a git repository: {path}", path = .path.display())]
    NotARepo {
        /// The path that was searched.
        path: PathBuf,
    },

    /// Repository has no working directory.
    #[error("bare repository not supported")]
    BareRepo,

    /// HEAD does not point at a branch (detached or unborn).
    #[error("HEAD is not on a branch")]
    DetachedHead,

    /// No default branch could be determined.
    #[error("cannot determine the default branch (no remote HEAD, no local main or master)")]
    NoDefaultBranch,

    /// Underlying libgit2 failure.
    #[error("git error: {message}")]
    Internal {
        /// The error message.
        message: String,
    },
}

impl From<git2::Error> for GitError {
    fn from(err: git2::Error) -> Self {
        GitError::Internal {
            message: err.message().to_string(),
        }
    }
}

/// Read-only repository facts the sync engine needs.
///
/// Mirrors what the engine actually consumes: branch roles, the remote
/// set, and the merged-branch list for cleanup. Implemented by [`Git`]
/// for real repositories and by scripted fakes in tests.
pub trait RepoQuery {
    /// The branch the repository designates as primary.
    fn default_branch(&self) -> Result<BranchName, GitError>;

    /// The branch HEAD currently points at.
    fn current_branch(&self) -> Result<BranchName, GitError>;

    /// Whether HEAD currently points at `branch`.
    ///
    /// Detached HEAD counts as "no" for every branch.
    fn is_current_branch(&self, branch: &BranchName) -> Result<bool, GitError>;

    /// Names of all configured remotes.
    fn remotes(&self) -> Result<Vec<RemoteName>, GitError>;

    /// Whether a remote with this exact name is configured.
    fn remote_exists(&self, name: &str) -> Result<bool, GitError>;

    /// Local branches whose tips are reachable from the default branch
    /// tip, in the order git reports them. Includes the default branch
    /// itself; callers that must not touch it filter it out.
    fn merged_branches(&self) -> Result<Vec<BranchName>, GitError>;
}

/// Introspection over a real repository.
pub struct Git {
    repo: git2::Repository,
}

impl std::fmt::Debug for Git {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Git").field("path", &self.repo.path()).finish()
    }
}

impl Git {
    /// Open the repository containing `path`.
    ///
    /// Uses `git2::Repository::discover`, so `path` can be any directory
    /// inside the working tree.
    ///
    /// # Errors
    ///
    /// - [`GitError::NotARepo`] if no repository is found
    /// - [`GitError::BareRepo`] if the repository has no working directory
    pub fn open(path: &Path) -> Result<Self, GitError> {
        let repo = git2::Repository::discover(path).map_err(|_| GitError::NotARepo {
            path: path.to_path_buf(),
        })?;

        if repo.is_bare() {
            return Err(GitError::BareRepo);
        }

        Ok(Self { repo })
    }

    /// Path of the `.git` directory.
    pub fn git_dir(&self) -> &Path {
        self.repo.path()
    }

    /// Path of the working directory.
    pub fn work_dir(&self) -> Result<&Path, GitError> {
        self.repo.workdir().ok_or(GitError::BareRepo)
    }

    /// Read the branch a remote's HEAD points at, if that remote has one.
    ///
    /// Clones record this as the symbolic ref `refs/remotes/<name>/HEAD`.
    fn remote_head_branch(&self, remote: &str) -> Option<BranchName> {
        let refname = format!("refs/remotes/{remote}/HEAD");
        let reference = self.repo.find_reference(&refname).ok()?;
        let target = reference.symbolic_target()?;
        let prefix = format!("refs/remotes/{remote}/");
        let name = target.strip_prefix(&prefix)?;
        BranchName::new(name).ok()
    }

    /// Whether a local branch with this name exists.
    fn local_branch_exists(&self, name: &str) -> bool {
        self.repo
            .find_branch(name, git2::BranchType::Local)
            .is_ok()
    }

    /// Tip commit id of a local branch.
    fn branch_tip(&self, name: &str) -> Result<git2::Oid, GitError> {
        let branch = self.repo.find_branch(name, git2::BranchType::Local)?;
        branch
            .get()
            .peel_to_commit()
            .map(|c| c.id())
            .map_err(GitError::from)
    }
}

impl RepoQuery for Git {
    fn default_branch(&self) -> Result<BranchName, GitError> {
        // A clone's origin/HEAD is authoritative; an upstream remote's
        // HEAD is the next best answer in fork topologies.
        for remote in ["origin", "upstream"] {
            if let Some(branch) = self.remote_head_branch(remote) {
                return Ok(branch);
            }
        }

        for name in ["main", "master"] {
            if self.local_branch_exists(name) {
                return BranchName::new(name).map_err(|e| GitError::Internal {
                    message: e.to_string(),
                });
            }
        }

        Err(GitError::NoDefaultBranch)
    }

    fn current_branch(&self) -> Result<BranchName, GitError> {
        let head = match self.repo.head() {
            Ok(head) => head,
            Err(e) if e.code() == git2::ErrorCode::UnbornBranch => {
                return Err(GitError::DetachedHead)
            }
            Err(e) => return Err(e.into()),
        };

        if !head.is_branch() {
            return Err(GitError::DetachedHead);
        }

        let name = head.shorthand().ok_or_else(|| GitError::Internal {
            message: "HEAD has a non-utf8 branch name".into(),
        })?;

        BranchName::new(name).map_err(|e| GitError::Internal {
            message: e.to_string(),
        })
    }

    fn is_current_branch(&self, branch: &BranchName) -> Result<bool, GitError> {
        match self.current_branch() {
            Ok(current) => Ok(current == *branch),
            Err(GitError::DetachedHead) => Ok(false),
            Err(e) => Err(e),
        }
    }

    fn remotes(&self) -> Result<Vec<RemoteName>, GitError> {
        let remotes = self.repo.remotes()?;
        Ok(remotes
            .iter()
            .flatten()
            .filter_map(|name| RemoteName::new(name).ok())
            .collect())
    }

    fn remote_exists(&self, name: &str) -> Result<bool, GitError> {
        match self.repo.find_remote(name) {
            Ok(_) => Ok(true),
            Err(e) if e.code() == git2::ErrorCode::NotFound => Ok(false),
            // libgit2 reports unknown remotes from config lookups as
            // InvalidSpec in some versions.
            Err(e) if e.code() == git2::ErrorCode::InvalidSpec => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn merged_branches(&self) -> Result<Vec<BranchName>, GitError> {
        let default = self.default_branch()?;
        let default_tip = self.branch_tip(default.as_str())?;

        let mut merged = Vec::new();
        for entry in self.repo.branches(Some(git2::BranchType::Local))? {
            let (branch, _) = entry?;
            let Some(name) = branch.name()?.map(String::from) else {
                continue;
            };
            let tip = match branch.get().peel_to_commit() {
                Ok(commit) => commit.id(),
                Err(_) => continue,
            };

            let is_merged =
                tip == default_tip || self.repo.graph_descendant_of(default_tip, tip)?;
            if is_merged {
                if let Ok(name) = BranchName::new(name) {
                    merged.push(name);
                }
            }
        }

        Ok(merged)
    }
}
