//! # Resub Architecture
//!
//! Resub rewrites text inside zip-packaged report bundles (`.prpt`) and inside
//! plain workflow definition files (`.kjb`, `.ktr`), applying an ordered list of
//! literal `old => new` substitutions read from a rules file. Typical use is
//! moving a whole reporting project to a new database host or schema without
//! opening every file by hand.
//!
//! Like any good CLI tool it is a library first. The binary is a thin client.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (cli/, wired by main.rs)                         │
//! │  - Parses arguments, formats output, handles terminal I/O   │
//! │  - The ONLY place that knows about stdout/stderr/exit codes │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - Owns the loaded RuleSet and config for one run           │
//! │  - Returns structured Result<CmdResult> values              │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Command Layer (commands/*.rs)                              │
//! │  - Input validation, per-file messages, aggregate counts    │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Core (rules, rewrite, repack, scan, batch)                 │
//! │  - Rule parsing, in-place rewrite, archive pipeline         │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## The repackaging pipeline
//!
//! A container is renamed to a staging archive, extracted to a private temporary
//! directory, every member is rewritten, the directory is zipped again and the new
//! archive takes the original name. The rename in the first step is the commit
//! point: from then on the original bytes always exist somewhere on disk. See
//! [`repack`] for the failure handling.
//!
//! ## Module Overview
//!
//! - [`api`]: The API facade
//! - [`commands`]: Validation and reporting for each operation
//! - [`rules`]: Rule file parsing and literal substitution
//! - [`rewrite`]: Single-file in-place rewrite
//! - [`repack`]: Archive repackaging pipeline
//! - [`scan`]: Directory traversal by extension
//! - [`batch`]: Directory-wide operations and their reports
//! - [`config`]: Configuration management
//! - [`init`]: Run context setup
//! - [`error`]: Error types

pub mod api;
pub mod batch;
pub mod commands;
pub mod config;
pub mod error;
pub mod init;
pub mod repack;
pub mod rewrite;
pub mod rules;
pub mod scan;
