//! headwater - keep a local clone in sync with its upstream remote
//!
//! Headwater is a single-binary tool for the everyday "catch my clone up"
//! chore: fetch from the authoritative remote, mirror or rebase the
//! checked-out branch depending on its role, refresh a personal fork,
//! and delete branches that have been merged.
//!
//! # Architecture
//!
//! The codebase follows a layered architecture:
//!
//! - [`cli`] - Command-line interface layer (parses args, delegates to engine)
//! - [`engine`] - The sync decision engine: logical operations, the runner
//!   that executes them, and the orchestrating session
//! - [`core`] - Validated domain types, cancellation, and the index-lock guard
//! - [`git`] - Single interface for repository introspection
//! - [`ui`] - Explicitly-configured output formatting
//!
//! # Correctness Invariants
//!
//! 1. The engine only decides *which* git operations run and in what
//!    order; execution belongs to the `git` binary via the runner
//! 2. Every mutating step waits for git's index lock first
//! 3. Any failure aborts the run; nothing is retried or rolled back
//! 4. The default branch resolved at session start is used for the whole
//!    run, and cleanup never deletes it

pub mod cli;
pub mod core;
pub mod engine;
pub mod git;
pub mod ui;
