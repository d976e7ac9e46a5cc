//! Directory-wide operations.
//!
//! Both batch forms walk the tree once with a [`Scan`], then process every match
//! one after the other. A failure on one file is recorded in the [`BatchReport`]
//! and the batch moves on. Only precondition failures (root is not a directory,
//! empty rule set) abort the whole operation, before any file is touched.

use crate::error::{ResubError, Result};
use crate::repack::{repackage_container, RepackOptions, RepackSummary};
use crate::rewrite::{rewrite_file, RewriteOutcome};
use crate::rules::RuleSet;
use crate::scan::Scan;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileStatus {
    Repacked(RepackSummary),
    Rewritten { replacements: usize },
    Unchanged,
    NotText,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReport {
    pub path: PathBuf,
    pub status: FileStatus,
}

impl FileReport {
    pub fn is_failure(&self) -> bool {
        matches!(self.status, FileStatus::Failed(_))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub root: PathBuf,
    pub files: Vec<FileReport>,
}

impl BatchReport {
    /// Number of matching files found (and processed).
    pub fn count(&self) -> usize {
        self.files.len()
    }

    pub fn failed(&self) -> usize {
        self.files.iter().filter(|f| f.is_failure()).count()
    }

    pub fn succeeded(&self) -> usize {
        self.count() - self.failed()
    }

    pub fn modified(&self) -> usize {
        self.files
            .iter()
            .filter(|f| match &f.status {
                FileStatus::Repacked(summary) => summary.modified > 0,
                FileStatus::Rewritten { .. } => true,
                _ => false,
            })
            .count()
    }
}

pub fn scan_and_repackage_containers(
    root: &Path,
    rules: &RuleSet,
    extension: &str,
    options: RepackOptions,
) -> Result<BatchReport> {
    let scan = prepare(root, rules, [extension])?;
    let targets: Vec<PathBuf> = scan.iter().collect();
    info!(root = %root.display(), found = targets.len(), "Repackaging containers");

    let files = targets
        .into_iter()
        .map(|path| {
            let status = match repackage_container(&path, rules, options) {
                Ok(repacked) => FileStatus::Repacked(repacked.summary),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Container failed");
                    FileStatus::Failed(e.to_string())
                }
            };
            FileReport { path, status }
        })
        .collect();

    Ok(BatchReport {
        root: root.to_path_buf(),
        files,
    })
}

pub fn scan_and_rewrite_plain_text<S: AsRef<str>>(
    root: &Path,
    rules: &RuleSet,
    extensions: &[S],
) -> Result<BatchReport> {
    let scan = prepare(root, rules, extensions.iter().map(|e| e.as_ref()))?;
    let targets: Vec<PathBuf> = scan.iter().collect();
    info!(root = %root.display(), found = targets.len(), "Rewriting text files");

    let files = targets
        .into_iter()
        .map(|path| {
            let status = match rewrite_file(&path, rules) {
                Ok(RewriteOutcome::Modified { replacements }) => {
                    FileStatus::Rewritten { replacements }
                }
                Ok(RewriteOutcome::Unchanged) => FileStatus::Unchanged,
                Ok(RewriteOutcome::NotText) => FileStatus::NotText,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Text file failed");
                    FileStatus::Failed(e.to_string())
                }
            };
            FileReport { path, status }
        })
        .collect();

    Ok(BatchReport {
        root: root.to_path_buf(),
        files,
    })
}

fn prepare<I, S>(root: &Path, rules: &RuleSet, extensions: I) -> Result<Scan>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    if !root.is_dir() {
        return Err(ResubError::InvalidPath(format!(
            "{} is not a directory",
            root.display()
        )));
    }
    if rules.is_empty() {
        return Err(ResubError::EmptyRuleSet(root.to_path_buf()));
    }
    Ok(Scan::new(root, extensions))
}
