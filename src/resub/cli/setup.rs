use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "resub", bin_name = "resub", version)]
#[command(
    about = "Bulk literal text substitution for .prpt report bundles and .kjb/.ktr workflow files",
    long_about = "Rewrites every occurrence of `old` with `new` for each `old => new` line of the \
                  rules file. Report bundles are unpacked, rewritten and packed again; workflow \
                  files are edited in place. Keep a backup of your project before running it."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Rules file (default: substitutions.txt, or `rules-file` from config)
    #[arg(short, long, global = true, value_name = "PATH")]
    pub rules: Option<PathBuf>,

    /// Replace a file that reappeared under a report's name during processing
    #[arg(short, long, global = true)]
    pub force: bool,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the loaded substitution rules
    #[command(alias = "ls")]
    Rules,

    /// Create an example rules file if none exists
    Init,

    /// Rewrite a single report bundle
    #[command(alias = "r")]
    Repack {
        /// Path to the report bundle (e.g. sales.prpt)
        path: PathBuf,
    },

    /// Rewrite every report bundle under a directory
    #[command(alias = "c")]
    Containers {
        /// Directory to scan recursively
        dir: PathBuf,
    },

    /// Rewrite every workflow file under a directory
    #[command(alias = "t")]
    Text {
        /// Directory to scan recursively
        dir: PathBuf,
    },

    /// Get or set configuration
    Config {
        /// Configuration key (rules-file, container-ext, text-exts, overwrite-existing)
        key: Option<String>,

        /// Value to set (if omitted, prints current value)
        value: Option<String>,
    },
}
