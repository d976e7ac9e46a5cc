//! # Text Rewriter
//!
//! Applies a [`RuleSet`] to a single file in place.
//!
//! The file is read whole and decoded as UTF-8. Files that do not decode (binary
//! members of a report bundle, images, fonts) are left alone and reported as
//! [`RewriteOutcome::NotText`]. That is an expected outcome, not an error.
//!
//! The file is written back only if the rewritten content differs from the
//! original, so untouched files keep their timestamps. Writes go through a
//! temporary sibling file followed by a rename, so a crash mid-write never leaves
//! a truncated file behind. The replacement keeps the original permission bits, and
//! a symlink is followed so the link itself survives. No backup of the previous content is kept here;
//! callers that need rollback work on a copy.

use crate::error::{ResubError, Result};
use crate::rules::RuleSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RewriteOutcome {
    Modified { replacements: usize },
    Unchanged,
    NotText,
}

impl RewriteOutcome {
    pub fn is_modified(&self) -> bool {
        matches!(self, RewriteOutcome::Modified { .. })
    }
}

pub fn rewrite_file<P: AsRef<Path>>(path: P, rules: &RuleSet) -> Result<RewriteOutcome> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|e| ResubError::fs("read", path, e))?;

    let text = match std::str::from_utf8(&bytes) {
        Ok(text) => text,
        Err(e) => {
            debug!(path = %path.display(), error = %e, "Skipping non-text file");
            return Ok(RewriteOutcome::NotText);
        }
    };

    let applied = rules.apply(text);
    if applied.text.as_bytes() == bytes.as_slice() {
        return Ok(RewriteOutcome::Unchanged);
    }

    write_atomic(path, applied.text.as_bytes())?;
    debug!(
        path = %path.display(),
        replacements = applied.replacements,
        "Rewrote file"
    );
    Ok(RewriteOutcome::Modified {
        replacements: applied.replacements,
    })
}

fn write_atomic(path: &Path, content: &[u8]) -> Result<()> {
    let target = fs::canonicalize(path).map_err(|e| ResubError::fs("resolve", path, e))?;
    let permissions = fs::metadata(&target)
        .map_err(|e| ResubError::fs("stat", &target, e))?
        .permissions();

    let tmp = tmp_sibling(&target);
    let written = fs::write(&tmp, content)
        .map_err(|e| ResubError::fs("write", &tmp, e))
        .and_then(|_| {
            fs::set_permissions(&tmp, permissions)
                .map_err(|e| ResubError::fs("set permissions on", &tmp, e))
        })
        .and_then(|_| fs::rename(&tmp, &target).map_err(|e| ResubError::fs("rename", &target, e)));

    if written.is_err() {
        let _ = fs::remove_file(&tmp);
    }
    written
}

fn tmp_sibling(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let tmp_name = format!(".{}-{}.tmp", name, &Uuid::new_v4().simple().to_string()[..8]);
    path.with_file_name(tmp_name)
}
