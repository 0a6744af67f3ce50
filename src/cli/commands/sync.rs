//! cli::commands::sync
//!
//! Wire a sync run together and hand it to the engine.
//!
//! The handler owns all the I/O plumbing the engine stays ignorant of:
//! opening the repository, placing the lock guard, choosing the runner,
//! and the optional end-of-run summary dump.

use std::path::PathBuf;

use anyhow::Result;

use crate::core::cancel::CancelToken;
use crate::core::lock::LockGuard;
use crate::engine::{Session, ShellRunner, SyncOptions};
use crate::git::Git;
use crate::ui::Reporter;

/// Run the sync command.
pub fn sync(cwd: Option<PathBuf>, opts: SyncOptions, out: &Reporter) -> Result<()> {
    let start = match cwd {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    let git = Git::open(&start)?;
    let lock = LockGuard::discover(&start)?;
    let runner = ShellRunner::new(git.work_dir()?.to_path_buf());
    let cancel = CancelToken::new();

    let session = Session::new(opts, &git, &runner, &lock, &cancel, out)?;
    let summary = session.run()?;

    if out.is_verbose() {
        out.verbose(serde_json::to_string_pretty(&summary)?);
    }

    Ok(())
}
