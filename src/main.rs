//! Drift - Command-line tool for simulating and rendering ambient particle fields

use std::process::ExitCode;

use driftfield::cli;

fn main() -> ExitCode {
    cli::run()
}
