//! Directory traversal for batch operations.
//!
//! A [`Scan`] only describes a walk (root + extensions). Calling [`Scan::iter`]
//! starts a fresh, lazy traversal each time, so the same scan can be replayed.
//! Nothing here reports to the user; callers decide what to do with the paths.

use std::path::{Path, PathBuf};
use tracing::warn;
use walkdir::WalkDir;

#[derive(Debug, Clone)]
pub struct Scan {
    root: PathBuf,
    extensions: Vec<String>,
}

impl Scan {
    /// Extensions are compared case-insensitively, with or without a leading dot.
    pub fn new<I, S>(root: impl Into<PathBuf>, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            root: root.into(),
            extensions: extensions
                .into_iter()
                .map(|e| normalize_ext(e.as_ref()))
                .collect(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn iter(&self) -> impl Iterator<Item = PathBuf> + '_ {
        WalkDir::new(&self.root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(e) => Some(e),
                Err(e) => {
                    warn!(error = %e, "Skipping unreadable directory entry");
                    None
                }
            })
            .filter(|e| e.file_type().is_file())
            .filter(move |e| self.matches(e.path()))
            .map(|e| e.into_path())
    }

    pub fn matches(&self, path: &Path) -> bool {
        has_extension(path, &self.extensions)
    }
}

pub fn normalize_ext(ext: &str) -> String {
    let ext = ext.trim().to_lowercase();
    if ext.starts_with('.') {
        ext
    } else {
        format!(".{}", ext)
    }
}

/// `extensions` must already be normalized.
pub fn has_extension(path: &Path, extensions: &[String]) -> bool {
    match path.extension() {
        Some(ext) => {
            let ext = format!(".{}", ext.to_string_lossy().to_lowercase());
            extensions.iter().any(|e| *e == ext)
        }
        None => false,
    }
}
