use crate::error::{ResubError, Result};
use crate::scan::normalize_ext;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_DIRNAME: &str = ".resub";
const CONFIG_FILENAME: &str = "config.json";
const DEFAULT_RULES_FILE: &str = "substitutions.txt";
const DEFAULT_CONTAINER_EXT: &str = ".prpt";

pub const KEYS: &[&str] = &[
    "rules-file",
    "container-ext",
    "text-exts",
    "overwrite-existing",
];

/// Configuration for resub, stored in .resub/config.json
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResubConfig {
    /// Rules file, relative to the working directory unless absolute
    #[serde(default = "default_rules_file")]
    pub rules_file: PathBuf,

    /// Extension of zip-packaged report bundles
    #[serde(default = "default_container_ext")]
    pub container_extension: String,

    /// Extensions of workflow files rewritten in place
    #[serde(default = "default_text_exts")]
    pub text_extensions: Vec<String>,

    /// Replace a file that reappears under a container's name mid-run
    #[serde(default)]
    pub overwrite_existing: bool,
}

fn default_rules_file() -> PathBuf {
    PathBuf::from(DEFAULT_RULES_FILE)
}

fn default_container_ext() -> String {
    DEFAULT_CONTAINER_EXT.to_string()
}

fn default_text_exts() -> Vec<String> {
    vec![".kjb".to_string(), ".ktr".to_string()]
}

impl Default for ResubConfig {
    fn default() -> Self {
        Self {
            rules_file: default_rules_file(),
            container_extension: default_container_ext(),
            text_extensions: default_text_exts(),
            overwrite_existing: false,
        }
    }
}

impl ResubConfig {
    /// Load config from the given directory, or return defaults if not found
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_path = config_dir.as_ref().join(CONFIG_FILENAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path).map_err(ResubError::Io)?;
        let config: ResubConfig =
            serde_json::from_str(&content).map_err(ResubError::Serialization)?;
        Ok(config)
    }

    pub fn save<P: AsRef<Path>>(&self, config_dir: P) -> Result<()> {
        let config_dir = config_dir.as_ref();

        if !config_dir.exists() {
            fs::create_dir_all(config_dir).map_err(ResubError::Io)?;
        }

        let config_path = config_dir.join(CONFIG_FILENAME);
        let content = serde_json::to_string_pretty(self).map_err(ResubError::Serialization)?;
        fs::write(config_path, content).map_err(ResubError::Io)?;
        Ok(())
    }

    /// Rules file resolved against `base` when relative.
    pub fn rules_path(&self, base: &Path) -> PathBuf {
        if self.rules_file.is_absolute() {
            self.rules_file.clone()
        } else {
            base.join(&self.rules_file)
        }
    }

    /// The container extension must not also be listed as a text extension.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self
            .text_extensions
            .iter()
            .any(|ext| ext.eq_ignore_ascii_case(&self.container_extension))
        {
            return Err(format!(
                "{} is both the container-ext and one of the text-exts",
                self.container_extension
            ));
        }
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "rules-file" => Some(self.rules_file.display().to_string()),
            "container-ext" => Some(self.container_extension.clone()),
            "text-exts" => Some(self.text_extensions.join(",")),
            "overwrite-existing" => Some(self.overwrite_existing.to_string()),
            _ => None,
        }
    }

    pub fn set(&mut self, key: &str, value: &str) -> std::result::Result<(), String> {
        match key {
            "rules-file" => {
                if value.trim().is_empty() {
                    return Err("rules-file cannot be empty".to_string());
                }
                self.rules_file = PathBuf::from(value.trim());
            }
            "container-ext" => {
                let ext = normalize_ext(value);
                if ext.len() < 2 {
                    return Err("container-ext cannot be empty".to_string());
                }
                self.container_extension = ext;
            }
            "text-exts" => {
                let exts: Vec<String> = value
                    .split(',')
                    .filter(|e| !e.trim().is_empty())
                    .map(normalize_ext)
                    .collect();
                if exts.is_empty() {
                    return Err("text-exts needs at least one extension".to_string());
                }
                self.text_extensions = exts;
            }
            "overwrite-existing" => {
                self.overwrite_existing = value
                    .trim()
                    .parse()
                    .map_err(|_| format!("Invalid boolean: {}", value))?;
            }
            _ => return Err(format!("Unknown config key: {}", key)),
        }
        Ok(())
    }
}
