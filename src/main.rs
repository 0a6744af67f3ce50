//! Binary entry point for `hw`.

use std::process::ExitCode;

fn main() -> ExitCode {
    headwater::cli::run()
}
