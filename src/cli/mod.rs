//! cli
//!
//! Command-line interface layer.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Build the reporter and sync options from flags
//! - Delegate to command handlers
//!
//! The CLI layer is thin: it parses arguments via clap and dispatches to
//! the [`crate::engine`]. All repository changes flow through the engine.

pub mod args;
pub mod commands;

pub use args::{Cli, Command, Shell};

use std::process::ExitCode;

use crate::engine::SyncOptions;
use crate::ui::Reporter;

/// Run the CLI application.
///
/// This is the entry point called from `main.rs`. Errors are printed
/// through the reporter and turn into a non-zero exit status.
pub fn run() -> ExitCode {
    let cli = Cli::parse_args();

    let out = Reporter::new(!cli.no_color, cli.verbose);
    let opts = SyncOptions {
        push: !cli.no_push,
        verbose: cli.verbose,
    };

    match commands::dispatch(cli.command, cli.cwd, opts, &out) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            out.error(format!("{err:#}"));
            ExitCode::FAILURE
        }
    }
}
