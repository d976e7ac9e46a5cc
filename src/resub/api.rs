//! # API Facade
//!
//! The API layer is a **thin facade** over the command layer. It owns the two
//! pieces of per-run state, the loaded [`RuleSet`] and the [`ResubConfig`], and
//! passes them by reference into the commands. There is no process-wide state.
//!
//! The API:
//! - **Dispatches** to the appropriate command function
//! - **Normalizes inputs** (config defaults, `--force` folded into repack options)
//! - **Returns structured types** (`Result<CmdResult>`)
//!
//! It never prints. Reporting is the caller's job.

use crate::commands;
use crate::config::ResubConfig;
use crate::error::Result;
use crate::repack::RepackOptions;
use crate::rewrite;
use crate::rules::RuleSet;
use std::path::{Path, PathBuf};

pub struct ResubApi {
    rules: RuleSet,
    rules_path: PathBuf,
    config: ResubConfig,
}

impl ResubApi {
    pub fn new(rules: RuleSet, rules_path: PathBuf, config: ResubConfig) -> Self {
        Self {
            rules,
            rules_path,
            config,
        }
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn rules_path(&self) -> &Path {
        &self.rules_path
    }

    pub fn config(&self) -> &ResubConfig {
        &self.config
    }

    pub fn show_rules(&self) -> Result<commands::CmdResult> {
        commands::rules::run(&self.rules, &self.rules_path)
    }

    pub fn init_rules(&self) -> Result<commands::CmdResult> {
        commands::init::run(&self.rules_path)
    }

    /// Returns whether the file changed.
    pub fn rewrite_file(&self, path: &Path) -> Result<bool> {
        Ok(rewrite::rewrite_file(path, &self.rules)?.is_modified())
    }

    pub fn repackage_container(&self, path: &Path, force: bool) -> Result<commands::CmdResult> {
        commands::repack::run(
            path,
            &self.rules,
            &self.config.container_extension,
            self.repack_options(force),
        )
    }

    pub fn scan_and_repackage_containers(
        &self,
        root: &Path,
        force: bool,
    ) -> Result<commands::CmdResult> {
        commands::containers::run(
            root,
            &self.rules,
            &self.config.container_extension,
            self.repack_options(force),
        )
    }

    pub fn scan_and_rewrite_plain_text(&self, root: &Path) -> Result<commands::CmdResult> {
        commands::text::run(root, &self.rules, &self.config.text_extensions)
    }

    fn repack_options(&self, force: bool) -> RepackOptions {
        RepackOptions {
            overwrite: force || self.config.overwrite_existing,
        }
    }
}

pub fn load_rules<P: AsRef<Path>>(path: P) -> Result<RuleSet> {
    RuleSet::load(path)
}

pub use crate::batch::{BatchReport, FileReport, FileStatus};
pub use crate::commands::config::ConfigAction;
pub use crate::commands::{CmdMessage, CmdResult, MessageLevel};
