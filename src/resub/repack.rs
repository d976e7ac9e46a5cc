//! # Archive Repackager
//!
//! Rewrites the text members of one zip-based container (a `.prpt` report bundle)
//! and puts a valid container of the same format back under the original name.
//!
//! Each run is a strict five-step sequence. No step starts before the previous one
//! has finished:
//!
//! 1. **Rename** the container to a staging archive next to it. From here on the
//!    original bytes are safe on disk no matter what fails later.
//! 2. **Extract** the staging archive into a fresh temporary directory in the same
//!    parent directory.
//! 3. **Rewrite** every extracted member through [`rewrite_file`].
//! 4. **Repack** the rewritten members into a new archive. Every entry of the
//!    source, directory entries included, is written back under its original name
//!    and in its original order, with its timestamp and permission bits. Only a
//!    `mimetype` member moves, to the front.
//! 5. **Finalize**: the new archive takes the original name, then the staging
//!    archive and the temporary directory are removed.
//!
//! A failure in steps 2 to 4 removes the temporary directory and any partial new
//! archive, and renames the staging archive back to the original name. If that
//! rename fails too, the staging archive is the one artifact left to recover from,
//! and the returned error names it.
//!
//! Artifact names carry a random suffix (`report-zip-stage-1a2b3c4d.zip`,
//! `report-modified-1a2b3c4d.zip`, `report-temp-XXXXXX/`), so two runs never
//! share a path and an unrelated `report.zip` in the same directory is never
//! touched.

use crate::error::{ResubError, Result};
use crate::rewrite::{rewrite_file, RewriteOutcome};
use crate::rules::RuleSet;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, warn};
use uuid::Uuid;
use zip::result::ZipError;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipArchive, ZipWriter};

/// Member written first and uncompressed, as the OpenDocument-style bundle
/// layout used by report definitions expects.
pub const MIMETYPE_MEMBER: &str = "mimetype";

#[derive(Debug, Clone, Copy, Default)]
pub struct RepackOptions {
    /// Replace a file that reappeared under the original name during the run.
    pub overwrite: bool,
}

/// Paths of every artifact a single run may create.
#[derive(Debug, Clone)]
pub struct StagePaths {
    pub original: PathBuf,
    pub staging: PathBuf,
    pub modified: PathBuf,
    pub parent: PathBuf,
    pub base: String,
}

impl StagePaths {
    pub fn for_container(path: &Path) -> Result<Self> {
        let base = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ResubError::InvalidPath(format!("{} has no file name", path.display())))?;
        let parent = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let token = Uuid::new_v4().simple().to_string();
        let suffix = &token[..8];

        Ok(Self {
            original: path.to_path_buf(),
            staging: parent.join(format!("{}-zip-stage-{}.zip", base, suffix)),
            modified: parent.join(format!("{}-modified-{}.zip", base, suffix)),
            parent,
            base,
        })
    }

    pub fn temp_prefix(&self) -> String {
        format!("{}-temp-", self.base)
    }
}

/// Per-member counts for one container.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RepackSummary {
    pub members: usize,
    pub modified: usize,
    pub unchanged: usize,
    pub not_text: usize,
    pub replacements: usize,
}

impl RepackSummary {
    fn record(&mut self, outcome: RewriteOutcome) {
        self.members += 1;
        match outcome {
            RewriteOutcome::Modified { replacements } => {
                self.modified += 1;
                self.replacements += replacements;
            }
            RewriteOutcome::Unchanged => self.unchanged += 1,
            RewriteOutcome::NotText => self.not_text += 1,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Repacked {
    pub path: PathBuf,
    pub summary: RepackSummary,
}

pub fn repackage_container(
    path: &Path,
    rules: &RuleSet,
    options: RepackOptions,
) -> Result<Repacked> {
    if !path.is_file() {
        return Err(ResubError::InvalidPath(format!(
            "{} is not a file",
            path.display()
        )));
    }
    let stage = StagePaths::for_container(path)?;

    // 1. Rename
    fs::rename(&stage.original, &stage.staging)
        .map_err(|e| ResubError::fs("rename", &stage.original, e))?;
    debug!(
        container = %stage.original.display(),
        staging = %stage.staging.display(),
        "Staged container"
    );

    // 2-4. Extract, rewrite, repack
    let summary = match build_modified(&stage, rules) {
        Ok(summary) => summary,
        Err(e) => return Err(rollback(&stage, e)),
    };

    // 5. Finalize
    finalize(&stage, options)?;
    debug!(
        container = %stage.original.display(),
        members = summary.members,
        modified = summary.modified,
        "Repackaged container"
    );

    Ok(Repacked {
        path: stage.original,
        summary,
    })
}

fn build_modified(stage: &StagePaths, rules: &RuleSet) -> Result<RepackSummary> {
    let workdir = tempfile::Builder::new()
        .prefix(&stage.temp_prefix())
        .tempdir_in(&stage.parent)
        .map_err(|e| ResubError::fs("create temp dir in", &stage.parent, e))?;

    let members = extract(&stage.staging, workdir.path())?;
    let summary = rewrite_members(&members, rules)?;
    write_archive(&members, &stage.modified)?;

    close_workdir(workdir);
    Ok(summary)
}

/// One entry of the source archive, in listing order.
struct Member {
    name: String,
    path: PathBuf,
    is_dir: bool,
    modified: Option<DateTime>,
    mode: Option<u32>,
}

fn extract(archive_path: &Path, dest: &Path) -> Result<Vec<Member>> {
    let wrap = |source: ZipError| ResubError::ArchiveExtract {
        path: archive_path.to_path_buf(),
        source,
    };

    let file = File::open(archive_path).map_err(|e| ResubError::fs("open", archive_path, e))?;
    let mut archive = ZipArchive::new(file).map_err(wrap)?;

    let mut members = Vec::with_capacity(archive.len());
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i).map_err(wrap)?;
        let rel = entry.enclosed_name().ok_or_else(|| {
            ResubError::InvalidPath(format!(
                "{} contains unsafe member {}",
                archive_path.display(),
                entry.name()
            ))
        })?;
        let path = dest.join(rel);
        let is_dir = entry.is_dir();

        if is_dir {
            fs::create_dir_all(&path).map_err(|e| ResubError::fs("create", &path, e))?;
        } else {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).map_err(|e| ResubError::fs("create", parent, e))?;
            }
            let mut out = File::create(&path).map_err(|e| ResubError::fs("create", &path, e))?;
            io::copy(&mut entry, &mut out).map_err(|e| wrap(ZipError::Io(e)))?;
        }

        members.push(Member {
            name: entry.name().to_string(),
            path,
            is_dir,
            modified: entry.last_modified(),
            mode: entry.unix_mode(),
        });
    }
    Ok(members)
}

fn rewrite_members(members: &[Member], rules: &RuleSet) -> Result<RepackSummary> {
    let mut summary = RepackSummary::default();
    for member in members.iter().filter(|m| !m.is_dir) {
        summary.record(rewrite_file(&member.path, rules)?);
    }
    Ok(summary)
}

/// `mimetype` first, everything else in source order.
fn in_write_order(members: &[Member]) -> impl Iterator<Item = &Member> {
    let is_mimetype = |m: &&Member| !m.is_dir && m.name == MIMETYPE_MEMBER;
    members
        .iter()
        .filter(is_mimetype)
        .chain(members.iter().filter(move |m| !is_mimetype(m)))
}

fn write_archive(members: &[Member], dest: &Path) -> Result<()> {
    let wrap = |source: ZipError| ResubError::ArchiveWrite {
        path: dest.to_path_buf(),
        source,
    };

    let file = File::create(dest).map_err(|e| ResubError::fs("create", dest, e))?;
    let mut zip = ZipWriter::new(file);

    for member in in_write_order(members) {
        if member.is_dir {
            zip.add_directory(
                member.name.as_str(),
                member_options(member, CompressionMethod::Stored),
            )
            .map_err(wrap)?;
            continue;
        }
        let method = if member.name == MIMETYPE_MEMBER {
            CompressionMethod::Stored
        } else {
            CompressionMethod::Deflated
        };
        zip.start_file(member.name.as_str(), member_options(member, method))
            .map_err(wrap)?;
        let mut src =
            File::open(&member.path).map_err(|e| ResubError::fs("open", &member.path, e))?;
        io::copy(&mut src, &mut zip).map_err(|e| wrap(ZipError::Io(e)))?;
    }

    zip.finish().map_err(wrap)?;
    Ok(())
}

/// Carries the source entry's timestamp and permission bits over.
fn member_options(member: &Member, method: CompressionMethod) -> SimpleFileOptions {
    let mut options = SimpleFileOptions::default().compression_method(method);
    if let Some(modified) = member.modified {
        options = options.last_modified_time(modified);
    }
    if let Some(mode) = member.mode {
        options = options.unix_permissions(mode);
    }
    options
}

fn close_workdir(workdir: TempDir) {
    let path = workdir.path().to_path_buf();
    if let Err(e) = workdir.close() {
        warn!(path = %path.display(), error = %e, "Failed to remove temp directory");
    }
}

fn finalize(stage: &StagePaths, options: RepackOptions) -> Result<()> {
    if stage.original.exists() && !options.overwrite {
        warn!(
            container = %stage.original.display(),
            modified = %stage.modified.display(),
            staging = %stage.staging.display(),
            "Destination reappeared, leaving artifacts in place"
        );
        return Err(ResubError::DestinationExists(stage.original.clone()));
    }

    if let Err(e) = fs::rename(&stage.modified, &stage.original) {
        let err = ResubError::fs("rename", &stage.modified, e);
        return Err(rollback(stage, err));
    }

    if let Err(e) = fs::remove_file(&stage.staging) {
        warn!(path = %stage.staging.display(), error = %e, "Failed to remove staging archive");
    }
    Ok(())
}

/// Puts the staging archive back under the original name after a failed run.
fn rollback(stage: &StagePaths, cause: ResubError) -> ResubError {
    if stage.modified.exists() {
        if let Err(e) = fs::remove_file(&stage.modified) {
            warn!(path = %stage.modified.display(), error = %e, "Failed to remove partial archive");
        }
    }

    if stage.original.exists() {
        return ResubError::Stranded {
            staging: stage.staging.clone(),
            source: Box::new(cause),
        };
    }

    match fs::rename(&stage.staging, &stage.original) {
        Ok(()) => {
            debug!(container = %stage.original.display(), "Restored original container");
            cause
        }
        Err(e) => {
            warn!(
                staging = %stage.staging.display(),
                error = %e,
                "Failed to restore original container"
            );
            ResubError::Stranded {
                staging: stage.staging.clone(),
                source: Box::new(cause),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};

    fn write_zip(path: &Path, members: &[(&str, &[u8])]) {
        let file = File::create(path).unwrap();
        let mut zip = ZipWriter::new(file);
        for (name, content) in members {
            zip.start_file(*name, SimpleFileOptions::default())
                .unwrap();
            zip.write_all(content).unwrap();
        }
        zip.finish().unwrap();
    }

    fn read_zip(path: &Path) -> Vec<(String, Vec<u8>)> {
        let mut archive = ZipArchive::new(File::open(path).unwrap()).unwrap();
        let mut out = Vec::new();
        for i in 0..archive.len() {
            let mut f = archive.by_index(i).unwrap();
            let mut buf = Vec::new();
            f.read_to_end(&mut buf).unwrap();
            out.push((f.name().to_string(), buf));
        }
        out
    }

    fn dir_names(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    const BINARY: &[u8] = &[0x89, b'P', b'N', b'G', 0xff, 0xfe, b'h', b'o', b's', b't'];

    #[test]
    fn test_repack_rewrites_text_and_keeps_binary() {
        let temp = tempfile::TempDir::new().unwrap();
        let prpt = temp.path().join("sales.prpt");
        write_zip(
            &prpt,
            &[
                ("mimetype", b"application/vnd.pentaho.reporting.classic"),
                ("content.xml", b"<db>host_old/schema_old</db>"),
                ("datadefinition/sql.xml", b"select * from schema_old.t"),
                ("resources/logo.png", BINARY),
            ],
        );

        let rules = RuleSet::parse("host_old => host_new\nschema_old => schema_new");
        let result = repackage_container(&prpt, &rules, RepackOptions::default()).unwrap();

        assert_eq!(result.path, prpt);
        assert_eq!(
            result.summary,
            RepackSummary {
                members: 4,
                modified: 2,
                unchanged: 1,
                not_text: 1,
                replacements: 3,
            }
        );

        let members = read_zip(&prpt);
        let names: Vec<&str> = members.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names.len(), 4);
        for expected in [
            "mimetype",
            "content.xml",
            "datadefinition/sql.xml",
            "resources/logo.png",
        ] {
            assert!(names.contains(&expected), "missing {}", expected);
        }

        let get = |name: &str| {
            members
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, c)| c.clone())
                .unwrap()
        };
        assert_eq!(get("content.xml"), b"<db>host_new/schema_new</db>");
        assert_eq!(get("datadefinition/sql.xml"), b"select * from schema_new.t");
        assert_eq!(get("resources/logo.png"), BINARY);
    }

    #[test]
    fn test_repack_without_matches_produces_valid_archive() {
        let temp = tempfile::TempDir::new().unwrap();
        let prpt = temp.path().join("plain.prpt");
        write_zip(&prpt, &[("a.xml", b"alpha"), ("b/c.xml", b"beta")]);

        let rules = RuleSet::parse("zzz => yyy");
        let result = repackage_container(&prpt, &rules, RepackOptions::default()).unwrap();

        assert_eq!(result.summary.modified, 0);
        let members = read_zip(&prpt);
        assert_eq!(
            members,
            vec![
                ("a.xml".to_string(), b"alpha".to_vec()),
                ("b/c.xml".to_string(), b"beta".to_vec()),
            ]
        );
    }

    #[test]
    fn test_repack_leaves_no_artifacts() {
        let temp = tempfile::TempDir::new().unwrap();
        let prpt = temp.path().join("r.prpt");
        write_zip(&prpt, &[("layout.xml", b"X")]);

        repackage_container(&prpt, &RuleSet::parse("X => Y"), RepackOptions::default()).unwrap();

        assert_eq!(dir_names(temp.path()), vec!["r.prpt".to_string()]);
    }

    #[test]
    fn test_repack_writes_mimetype_first_and_stored() {
        let temp = tempfile::TempDir::new().unwrap();
        let prpt = temp.path().join("m.prpt");
        write_zip(
            &prpt,
            &[("a.xml", b"a"), ("mimetype", b"application/vnd.pentaho")],
        );

        repackage_container(&prpt, &RuleSet::parse("zzz => y"), RepackOptions::default())
            .unwrap();

        let mut archive = ZipArchive::new(File::open(&prpt).unwrap()).unwrap();
        let first = archive.by_index(0).unwrap();
        assert_eq!(first.name(), "mimetype");
        assert_eq!(first.compression(), CompressionMethod::Stored);
    }

    #[test]
    fn test_repack_corrupt_archive_restores_original() {
        let temp = tempfile::TempDir::new().unwrap();
        let prpt = temp.path().join("broken.prpt");
        fs::write(&prpt, b"this is not a zip file").unwrap();

        let err = repackage_container(&prpt, &RuleSet::parse("a => b"), RepackOptions::default())
            .unwrap_err();

        assert!(matches!(err, ResubError::ArchiveExtract { .. }));
        assert_eq!(fs::read(&prpt).unwrap(), b"this is not a zip file");
        assert_eq!(dir_names(temp.path()), vec!["broken.prpt".to_string()]);
    }

    #[test]
    fn test_repack_does_not_touch_unrelated_zip() {
        let temp = tempfile::TempDir::new().unwrap();
        let prpt = temp.path().join("report.prpt");
        let bystander = temp.path().join("report.zip");
        write_zip(&prpt, &[("a.xml", b"old")]);
        fs::write(&bystander, b"keep me").unwrap();

        repackage_container(&prpt, &RuleSet::parse("old => new"), RepackOptions::default())
            .unwrap();

        assert_eq!(fs::read(&bystander).unwrap(), b"keep me");
        assert_eq!(read_zip(&prpt)[0].1, b"new");
    }

    #[test]
    fn test_repack_preserves_empty_directories() {
        let temp = tempfile::TempDir::new().unwrap();
        let prpt = temp.path().join("d.prpt");
        {
            let mut zip = ZipWriter::new(File::create(&prpt).unwrap());
            zip.add_directory("empty/", SimpleFileOptions::default())
                .unwrap();
            zip.start_file("a.xml", SimpleFileOptions::default())
                .unwrap();
            zip.write_all(b"a").unwrap();
            zip.finish().unwrap();
        }

        repackage_container(&prpt, &RuleSet::parse("a => b"), RepackOptions::default()).unwrap();

        let names: Vec<String> = read_zip(&prpt).into_iter().map(|(n, _)| n).collect();
        assert!(names.contains(&"a.xml".to_string()));
        assert!(names.contains(&"empty/".to_string()));
    }

    #[test]
    fn test_repack_keeps_every_entry_and_its_metadata() {
        let temp = tempfile::TempDir::new().unwrap();
        let prpt = temp.path().join("meta.prpt");
        let stamp = DateTime::from_date_and_time(2019, 6, 14, 9, 30, 0).unwrap();
        {
            let options = SimpleFileOptions::default()
                .last_modified_time(stamp)
                .unix_permissions(0o600);
            let mut zip = ZipWriter::new(File::create(&prpt).unwrap());
            zip.add_directory("META-INF/", options).unwrap();
            zip.start_file("META-INF/manifest.xml", options).unwrap();
            zip.write_all(b"<manifest>schema_old</manifest>").unwrap();
            zip.start_file("layout.xml", options).unwrap();
            zip.write_all(b"<layout/>").unwrap();
            zip.finish().unwrap();
        }

        repackage_container(
            &prpt,
            &RuleSet::parse("schema_old => schema_new"),
            RepackOptions::default(),
        )
        .unwrap();

        let names: Vec<String> = read_zip(&prpt).into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["META-INF/", "META-INF/manifest.xml", "layout.xml"]);

        let mut archive = ZipArchive::new(File::open(&prpt).unwrap()).unwrap();
        for i in 0..archive.len() {
            let entry = archive.by_index(i).unwrap();
            assert_eq!(entry.last_modified(), Some(stamp), "{}", entry.name());
            if !entry.is_dir() {
                assert_eq!(entry.unix_mode().unwrap() & 0o777, 0o600, "{}", entry.name());
            }
        }
    }

    #[test]
    fn test_repack_missing_file_is_invalid_path() {
        let temp = tempfile::TempDir::new().unwrap();
        let err = repackage_container(
            &temp.path().join("nope.prpt"),
            &RuleSet::parse("a => b"),
            RepackOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ResubError::InvalidPath(_)));
    }

    #[test]
    fn test_stage_paths_are_unique_and_derived_from_base() {
        let a = StagePaths::for_container(Path::new("dir/sales.prpt")).unwrap();
        let b = StagePaths::for_container(Path::new("dir/sales.prpt")).unwrap();

        assert_ne!(a.staging, b.staging);
        assert_eq!(a.parent, PathBuf::from("dir"));
        let staging = a.staging.file_name().unwrap().to_string_lossy().into_owned();
        assert!(staging.starts_with("sales-zip-stage-"));
        assert!(staging.ends_with(".zip"));
        assert_eq!(a.temp_prefix(), "sales-temp-");
    }

    #[test]
    fn test_finalize_refuses_existing_destination() {
        let temp = tempfile::TempDir::new().unwrap();
        let stage = StagePaths::for_container(&temp.path().join("x.prpt")).unwrap();
        fs::write(&stage.original, b"someone else").unwrap();
        fs::write(&stage.staging, b"old").unwrap();
        fs::write(&stage.modified, b"new").unwrap();

        let err = finalize(&stage, RepackOptions { overwrite: false }).unwrap_err();
        assert!(matches!(err, ResubError::DestinationExists(_)));
        assert_eq!(fs::read(&stage.original).unwrap(), b"someone else");
        assert!(stage.staging.exists());
        assert!(stage.modified.exists());

        finalize(&stage, RepackOptions { overwrite: true }).unwrap();
        assert_eq!(fs::read(&stage.original).unwrap(), b"new");
        assert!(!stage.staging.exists());
        assert!(!stage.modified.exists());
    }
}
