//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! Each handler validates its arguments, builds the engine's
//! collaborators, and formats output. Handlers never mutate the
//! repository directly; every git operation flows through the engine.

mod completion;
mod sync;

pub use completion::completion;
pub use sync::sync;

use std::path::PathBuf;

use anyhow::Result;

use crate::cli::args::Command;
use crate::engine::SyncOptions;
use crate::ui::Reporter;

/// Dispatch a parsed command to its handler.
///
/// No subcommand means `sync`, the tool's single purpose.
pub fn dispatch(
    command: Option<Command>,
    cwd: Option<PathBuf>,
    opts: SyncOptions,
    out: &Reporter,
) -> Result<()> {
    match command.unwrap_or(Command::Sync) {
        Command::Sync => sync(cwd, opts, out),
        Command::Completion { shell } => completion(shell),
    }
}
