//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! Available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--cwd <path>`: Run as if started in that directory
//! - `-P` / `--no-push`: Do not push to origin after syncing
//! - `-v` / `--verbose`: Relay git output and dump the session summary
//! - `-C` / `--no-color`: Disable colored output

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// headwater - keep a local clone in sync with its upstream remote
#[derive(Parser, Debug)]
#[command(name = "hw")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Run as if hw was started in this directory
    #[arg(long, global = true)]
    pub cwd: Option<PathBuf>,

    /// Do not push to origin after syncing
    #[arg(short = 'P', long, global = true)]
    pub no_push: bool,

    /// Relay git output and print the session summary
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(short = 'C', long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

/// Available commands. Running with no subcommand is the same as `sync`.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Synchronize the repository with its upstream remote
    #[command(
        name = "sync",
        long_about = "Synchronize the repository with its upstream remote.\n\n\
            Fetches from the authoritative remote (a remote named 'upstream' when \
            one exists, 'origin' otherwise), then syncs by branch role: on the \
            default branch the local branch is reset to mirror upstream and merged \
            branches are deleted; on a feature branch the branch is rebased onto \
            its upstream counterpart. Unless --no-push is given, the synced branch \
            is force-pushed to origin.",
        after_help = "\
WORKFLOW EXAMPLES:
    # Sync the current branch (push to origin afterwards)
    hw

    # Sync without touching the fork
    hw -P

    # Watch the underlying git commands and their output
    hw -v"
    )]
    Sync,

    /// Generate shell completion scripts
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Shells supported by the completion command.
#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}
