use crate::api::ResubApi;
use crate::config::{ResubConfig, CONFIG_DIRNAME};
use crate::error::Result;
use crate::rules::RuleSet;
use std::path::{Path, PathBuf};

pub struct ResubContext {
    pub api: ResubApi,
    /// True when the rules file was missing and the example was written.
    pub bootstrapped_rules: bool,
}

/// Resolves the rules file: an explicit path wins, then the configured one.
pub fn rules_path(cwd: &Path, config: &ResubConfig, explicit: Option<&Path>) -> PathBuf {
    match explicit {
        Some(p) if p.is_absolute() => p.to_path_buf(),
        Some(p) => cwd.join(p),
        None => config.rules_path(cwd),
    }
}

pub fn load_config(cwd: &Path) -> Result<ResubConfig> {
    ResubConfig::load(cwd.join(CONFIG_DIRNAME))
}

/// Builds the API for a run. The rule set is loaded once here; a missing rules
/// file is replaced by the example rules.
pub fn initialize(cwd: &Path, rules_override: Option<&Path>) -> Result<ResubContext> {
    let config = load_config(cwd)?;
    let rules_file = rules_path(cwd, &config, rules_override);
    let (rules, bootstrapped_rules) = RuleSet::load_or_bootstrap(&rules_file)?;

    Ok(ResubContext {
        api: ResubApi::new(rules, rules_file, config),
        bootstrapped_rules,
    })
}
