//! # CLI Layer
//!
//! This module is **one possible UI client** for resub. It is the only place that:
//! - Knows about terminal I/O (stdout, stderr)
//! - Handles argument parsing
//! - Installs the log subscriber
//! - Formats output for human consumption
//!
//! ## Structure
//!
//! - `setup.rs`: clap definitions
//! - `commands.rs`: `run()`, context setup, per-command handlers
//! - `print.rs`: rendering of `CmdResult`s

mod commands;
mod print;
mod setup;

pub use commands::{run, Outcome};
