use crate::commands::{CmdMessage, CmdResult};
use crate::config::{ResubConfig, CONFIG_DIRNAME};
use crate::error::{ResubError, Result};
use std::path::Path;

#[derive(Debug, Clone)]
pub enum ConfigAction {
    ShowAll,
    ShowKey(String),
    Set(String, String),
}

/// Reads or updates `<cwd>/.resub/config.json`.
///
/// Unknown keys and rejected values are errors. A change that would make the
/// container extension collide with a text extension is refused and nothing is
/// written.
pub fn run(cwd: &Path, action: ConfigAction) -> Result<CmdResult> {
    let config_dir = cwd.join(CONFIG_DIRNAME);
    let mut config = ResubConfig::load(&config_dir)?;

    match action {
        ConfigAction::ShowAll => {
            let mut result = CmdResult::default();
            result.add_message(rules_file_message(cwd, &config));
            if let Err(e) = config.validate() {
                result.add_message(CmdMessage::warning(e));
            }
            Ok(result.with_config(config))
        }
        ConfigAction::ShowKey(key) => {
            let value = config
                .get(&key)
                .ok_or_else(|| ResubError::Config(format!("Unknown config key: {}", key)))?;
            let mut result = CmdResult::default();
            result.add_message(CmdMessage::info(value));
            if key == "rules-file" {
                result.add_message(rules_file_message(cwd, &config));
            }
            Ok(result)
        }
        ConfigAction::Set(key, value) => {
            config.set(&key, &value).map_err(ResubError::Config)?;
            config.validate().map_err(ResubError::Config)?;
            config.save(&config_dir)?;

            let display_val = config.get(&key).unwrap_or(value);
            let mut result = CmdResult::default();
            result.add_message(CmdMessage::success(format!(
                "{} set to {}",
                key, display_val
            )));
            if key == "rules-file" {
                result.add_message(rules_file_message(cwd, &config));
            }
            Ok(result.with_config(config))
        }
    }
}

fn rules_file_message(cwd: &Path, config: &ResubConfig) -> CmdMessage {
    let path = config.rules_path(cwd);
    if path.is_file() {
        CmdMessage::info(format!("Rules are read from {}", path.display()))
    } else {
        CmdMessage::warning(format!(
            "Rules file {} does not exist yet (run `resub init`)",
            path.display()
        ))
    }
}
