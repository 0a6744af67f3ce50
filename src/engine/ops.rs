//! engine::ops
//!
//! The logical git operations the sync engine emits.
//!
//! The engine decides *which* operations run and *in what order*; the
//! runner decides how they execute. [`GitOp`] is the closed vocabulary
//! between the two: each variant renders the exact `git` argv it stands
//! for, and its `Display` form is the command line echoed to the user.

use crate::core::types::{BranchName, RemoteName};

/// A single logical git operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GitOp {
    /// `git fetch <remote> --prune --prune-tags`
    Fetch {
        remote: RemoteName,
        prune: bool,
        prune_tags: bool,
    },

    /// `git fetch -u <remote> +<branch>:<branch>`
    ///
    /// Force-updates the local branch ref from the remote without
    /// checking it out. Used to keep the default branch current while a
    /// feature branch is checked out.
    FetchRefUpdate {
        remote: RemoteName,
        branch: BranchName,
    },

    /// `git reset --hard <remote>/<branch>`
    ResetHard {
        remote: RemoteName,
        branch: BranchName,
    },

    /// `git pull --rebase <remote> <branch>`
    PullRebase {
        remote: RemoteName,
        branch: BranchName,
    },

    /// `git push --force <remote> <branch>`
    PushForce {
        remote: RemoteName,
        branch: BranchName,
    },

    /// `git branch -D <branch>`
    DeleteBranch { branch: BranchName },
}

impl GitOp {
    /// Arguments passed to the `git` binary for this operation.
    pub fn argv(&self) -> Vec<String> {
        match self {
            GitOp::Fetch {
                remote,
                prune,
                prune_tags,
            } => {
                let mut argv = vec!["fetch".to_string(), remote.to_string()];
                if *prune {
                    argv.push("--prune".into());
                }
                if *prune_tags {
                    argv.push("--prune-tags".into());
                }
                argv
            }
            GitOp::FetchRefUpdate { remote, branch } => vec![
                "fetch".into(),
                "-u".into(),
                remote.to_string(),
                format!("+{branch}:{branch}"),
            ],
            GitOp::ResetHard { remote, branch } => vec![
                "reset".into(),
                "--hard".into(),
                format!("{remote}/{branch}"),
            ],
            GitOp::PullRebase { remote, branch } => vec![
                "pull".into(),
                "--rebase".into(),
                remote.to_string(),
                branch.to_string(),
            ],
            GitOp::PushForce { remote, branch } => vec![
                "push".into(),
                "--force".into(),
                remote.to_string(),
                branch.to_string(),
            ],
            GitOp::DeleteBranch { branch } => {
                vec!["branch".into(), "-D".into(), branch.to_string()]
            }
        }
    }
}

impl std::fmt::Display for GitOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "git {}", self.argv().join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn remote(name: &str) -> RemoteName {
        RemoteName::new(name).unwrap()
    }

    fn branch(name: &str) -> BranchName {
        BranchName::new(name).unwrap()
    }

    #[test]
    fn fetch_argv() {
        let op = GitOp::Fetch {
            remote: remote("upstream"),
            prune: true,
            prune_tags: true,
        };
        assert_eq!(op.argv(), ["fetch", "upstream", "--prune", "--prune-tags"]);

        let bare = GitOp::Fetch {
            remote: remote("origin"),
            prune: false,
            prune_tags: false,
        };
        assert_eq!(bare.argv(), ["fetch", "origin"]);
    }

    #[test]
    fn fetch_ref_update_forces_the_refspec() {
        let op = GitOp::FetchRefUpdate {
            remote: remote("upstream"),
            branch: branch("main"),
        };
        assert_eq!(op.argv(), ["fetch", "-u", "upstream", "+main:main"]);
    }

    #[test]
    fn reset_hard_targets_the_remote_ref() {
        let op = GitOp::ResetHard {
            remote: remote("upstream"),
            branch: branch("main"),
        };
        assert_eq!(op.argv(), ["reset", "--hard", "upstream/main"]);
    }

    #[test]
    fn pull_rebase_argv() {
        let op = GitOp::PullRebase {
            remote: remote("origin"),
            branch: branch("feature-x"),
        };
        assert_eq!(op.argv(), ["pull", "--rebase", "origin", "feature-x"]);
    }

    #[test]
    fn push_force_argv() {
        let op = GitOp::PushForce {
            remote: remote("origin"),
            branch: branch("feature-x"),
        };
        assert_eq!(op.argv(), ["push", "--force", "origin", "feature-x"]);
    }

    #[test]
    fn delete_branch_argv() {
        let op = GitOp::DeleteBranch {
            branch: branch("merged-thing"),
        };
        assert_eq!(op.argv(), ["branch", "-D", "merged-thing"]);
    }

    #[test]
    fn display_is_the_echoed_command_line() {
        let op = GitOp::Fetch {
            remote: remote("upstream"),
            prune: true,
            prune_tags: true,
        };
        assert_eq!(op.to_string(), "git fetch upstream --prune --prune-tags");
    }
}
