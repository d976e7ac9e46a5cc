//! # Substitution Rules
//!
//! A [`RuleSet`] is an ordered list of literal `(pattern, replacement)` pairs read
//! from a plain UTF-8 rules file, one rule per line:
//!
//! ```text
//! jdbc:postgresql://localhost:5432/db_old => jdbc:postgresql://localhost:5432/db_new
//! schema_old => schema_new
//! ```
//!
//! Order matters. Rules are applied one after the other, each one scanning the text
//! already modified by the rules before it. Application is a single pass, not a
//! fixed point: a replacement that contains its own pattern is not re-expanded.
//!
//! Parsing rules:
//! - Pattern and replacement are split on the **first** `=>` only, so a replacement
//!   may itself contain `=>`.
//! - Surrounding whitespace is trimmed on both sides.
//! - Every line containing `=>` is a rule, even one starting with `#`, so colour
//!   codes such as `#FF0000 => #00FF00` work.
//! - Lines without `=>` are ignored. Blank lines and `#` comments are not counted
//!   as skipped.
//! - A line whose pattern is empty after trimming is ignored.
//!
//! The set is built once per run and never mutated afterwards. It is passed by
//! reference into every operation.

use crate::error::{ResubError, Result};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

pub const SEPARATOR: &str = "=>";

pub const EXAMPLE_RULES: &str = "\
jdbc:postgresql://localhost:5432/db_old => jdbc:postgresql://localhost:5432/db_new
schema_old => schema_new
";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub pattern: String,
    pub replacement: String,
}

impl Rule {
    /// Returns `None` for an empty pattern.
    pub fn new(pattern: impl Into<String>, replacement: impl Into<String>) -> Option<Self> {
        let pattern = pattern.into();
        if pattern.is_empty() {
            return None;
        }
        Some(Self {
            pattern,
            replacement: replacement.into(),
        })
    }

    /// Parses one `pattern => replacement` line.
    pub fn parse_line(line: &str) -> Option<Self> {
        let (pattern, replacement) = line.trim().split_once(SEPARATOR)?;
        Self::new(pattern.trim(), replacement.trim())
    }
}

impl std::fmt::Display for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {}", self.pattern, SEPARATOR, self.replacement)
    }
}

/// Result of applying a rule set to a piece of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Applied {
    pub text: String,
    pub replacements: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSet {
    rules: Vec<Rule>,
    skipped_lines: usize,
}

impl RuleSet {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self {
            rules,
            skipped_lines: 0,
        }
    }

    pub fn parse(source: &str) -> Self {
        let mut rules = Vec::new();
        let mut skipped_lines = 0;

        for line in source.lines() {
            match Rule::parse_line(line) {
                Some(rule) => rules.push(rule),
                None if is_comment_or_blank(line) => {}
                None => skipped_lines += 1,
            }
        }

        Self {
            rules,
            skipped_lines,
        }
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ResubError::RuleSourceMissing(path.to_path_buf()));
        }
        let content = fs::read_to_string(path).map_err(ResubError::Io)?;
        let set = Self::parse(&content);
        debug!(
            path = %path.display(),
            rules = set.len(),
            skipped = set.skipped_lines,
            "Loaded substitution rules"
        );
        Ok(set)
    }

    /// Loads the rules file, writing the example rules first if it does not exist.
    /// The flag is true when the example had to be created.
    pub fn load_or_bootstrap<P: AsRef<Path>>(path: P) -> Result<(Self, bool)> {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(set) => Ok((set, false)),
            Err(ResubError::RuleSourceMissing(_)) => {
                write_example(path)?;
                Ok((Self::load(path)?, true))
            }
            Err(e) => Err(e),
        }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Lines that were neither rules, blanks nor comments.
    pub fn skipped_lines(&self) -> usize {
        self.skipped_lines
    }

    pub fn apply(&self, text: &str) -> Applied {
        let mut current = text.to_string();
        let mut replacements = 0;

        for rule in &self.rules {
            let hits = current.matches(rule.pattern.as_str()).count();
            if hits > 0 {
                current = current.replace(rule.pattern.as_str(), &rule.replacement);
                replacements += hits;
            }
        }

        Applied {
            text: current,
            replacements,
        }
    }
}

fn is_comment_or_blank(line: &str) -> bool {
    let line = line.trim();
    line.is_empty() || (line.starts_with('#') && !line.contains(SEPARATOR))
}

/// Writes the example rules file. An existing file is left untouched.
pub fn write_example<P: AsRef<Path>>(path: P) -> Result<bool> {
    let path = path.as_ref();
    if path.exists() {
        return Ok(false);
    }
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(ResubError::Io)?;
        }
    }
    fs::write(path, EXAMPLE_RULES).map_err(ResubError::Io)?;
    info!(path = %path.display(), "Created example rules file");
    Ok(true)
}
