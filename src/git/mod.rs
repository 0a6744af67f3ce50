//! git
//!
//! Single interface for repository introspection.

pub mod interface;

pub use interface::{Git, GitError, RepoQuery};
