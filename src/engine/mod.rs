//! engine
//!
//! The synchronization decision engine.
//!
//! # Architecture
//!
//! The engine composes three pieces:
//!
//! - [`ops`] - the closed vocabulary of logical git operations
//! - [`runner`] - executes operations through the real `git` binary
//! - [`sync`] - the orchestrator: decides which operations run, in what
//!   order, guarded by the repository's index lock
//!
//! The engine never touches libgit2 and never prints directly; it reads
//! repository facts through [`crate::git::RepoQuery`] and reports through
//! an injected [`crate::ui::Reporter`].

pub mod ops;
pub mod runner;
pub mod sync;

pub use ops::GitOp;
pub use runner::{GitRunner, RunOutput, RunnerError, ShellRunner};
pub use sync::{
    is_default_branch, resolve_upstream, BranchRole, RunSummary, Session, SyncError, SyncOptions,
};
