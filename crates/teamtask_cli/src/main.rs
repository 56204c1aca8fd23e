//! teamtask - team workload balancing from the command line.
//!
//! A thin CLI over `teamtask_core`: every command opens the SQLite store,
//! runs one use-case and prints its result as JSON.

use clap::Parser;
use std::process::ExitCode;

mod commands;

use commands::Cli;

fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.execute() {
        Ok(output) => {
            println!("{}", output.body);
            output.exit_code()
        }
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
