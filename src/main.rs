//! Cascade CLI - Conditional enablement for tool input forms

use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(e) = cascade_cli::cli::run() {
        eprintln!("Error: {:#}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
