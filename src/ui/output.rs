//! ui::output
//!
//! Terminal output with explicit configuration.
//!
//! # Design
//!
//! A [`Reporter`] is built once from the CLI flags (color on/off,
//! verbose on/off) and passed into whatever needs to print. Nothing here
//! is process-global: disabling color for one reporter cannot affect
//! another, and the engine stays testable independent of formatting.
//!
//! The visual dialect is badge-prefixed lines (` info    `, ` error   `,
//! ` verbose `), blue remote names, magenta branch names, `> git ...`
//! command echoes, and a carriage-return progress line while waiting on
//! the index lock.

use std::fmt::Display;
use std::io::Write;

use console::Style;

use crate::core::types::{BranchName, RemoteName};

/// Width of the lock-wait progress line; the clear sequence blanks it.
const WAIT_LINE_WIDTH: usize = 30;

/// Formats and prints user-facing output.
#[derive(Debug, Clone)]
pub struct Reporter {
    color: bool,
    verbose: bool,
}

impl Reporter {
    /// Create a reporter. `color` off means plain text everywhere.
    pub fn new(color: bool, verbose: bool) -> Self {
        Self { color, verbose }
    }

    /// Whether verbose output is enabled.
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    fn paint(&self, style: Style, text: &str) -> String {
        if self.color {
            style.apply_to(text).to_string()
        } else {
            text.to_string()
        }
    }

    /// Print a line with no decoration.
    pub fn plain(&self, message: impl Display) {
        println!("{message}");
    }

    /// Print an info line with its badge.
    pub fn info(&self, message: impl Display) {
        let badge = self.paint(Style::new().black().on_blue(), " info    ");
        println!("{badge} {message}");
    }

    /// Print a verbose line with its badge. Dropped unless verbose.
    pub fn verbose(&self, message: impl Display) {
        if self.verbose {
            let badge = self.paint(Style::new().black().on_white(), " verbose ");
            println!("{badge} {message}");
        }
    }

    /// Print an error line with its badge. Always shown, on stderr.
    pub fn error(&self, message: impl Display) {
        let badge = self.paint(Style::new().black().on_red(), " error   ");
        eprintln!("{badge} {message}");
    }

    /// Echo a command about to run.
    pub fn command(&self, command: impl Display) {
        println!("> {command}");
    }

    /// Relay captured command output, indented under the echo line.
    /// Blank output prints nothing.
    pub fn output_block(&self, text: &str) {
        if text.trim().is_empty() {
            return;
        }
        for line in text.trim_end().lines() {
            println!("          {line}");
        }
    }

    /// Style a remote name for embedding in a message.
    pub fn remote(&self, name: &RemoteName) -> String {
        self.paint(Style::new().blue(), name.as_str())
    }

    /// Style a branch name for embedding in a message.
    pub fn branch(&self, name: &BranchName) -> String {
        self.paint(Style::new().magenta(), name.as_str())
    }

    /// Overwrite the current line with lock-wait progress.
    pub fn lock_waiting(&self, attempt: u64) {
        print!("\r> Waiting for lock [{attempt}]");
        let _ = std::io::stdout().flush();
    }

    /// Blank the lock-wait progress line.
    pub fn lock_wait_done(&self) {
        print!("\r{:width$}\r", "", width = WAIT_LINE_WIDTH);
        let _ = std::io::stdout().flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paint_without_color_is_passthrough() {
        let out = Reporter::new(false, false);
        assert_eq!(out.paint(Style::new().blue(), "origin"), "origin");
    }

    #[test]
    fn styled_names_keep_their_text() {
        let out = Reporter::new(true, false);
        let remote = RemoteName::new("upstream").unwrap();
        let branch = BranchName::new("feature/x").unwrap();

        assert_eq!(console::strip_ansi_codes(&out.remote(&remote)), "upstream");
        assert_eq!(console::strip_ansi_codes(&out.branch(&branch)), "feature/x");
    }

    #[test]
    fn verbose_flag_is_reported() {
        assert!(Reporter::new(false, true).is_verbose());
        assert!(!Reporter::new(false, false).is_verbose());
    }
}
