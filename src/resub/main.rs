//! # Resub CLI
//!
//! The binary is intentionally thin: the CLI lives in `cli/`, while this file only
//! invokes `cli::run()` and turns the outcome into an exit code.
//!
//! - `0`: everything succeeded
//! - `1`: the requested operation could not run (bad path, no rules, broken config)
//! - `2`: the operation ran but at least one file failed

mod cli;

fn main() {
    match cli::run() {
        Ok(cli::Outcome::Clean) => {}
        Ok(cli::Outcome::PartialFailure) => std::process::exit(2),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
