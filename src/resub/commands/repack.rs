use crate::batch::{FileReport, FileStatus};
use crate::commands::{file_message, CmdMessage, CmdResult};
use crate::error::{ResubError, Result};
use crate::repack::{repackage_container, RepackOptions};
use crate::rules::RuleSet;
use crate::scan::{has_extension, normalize_ext};
use std::path::Path;

pub fn run(
    path: &Path,
    rules: &RuleSet,
    extension: &str,
    options: RepackOptions,
) -> Result<CmdResult> {
    let extension = normalize_ext(extension);
    if !path.is_file() {
        return Err(ResubError::InvalidPath(format!(
            "{} not found",
            path.display()
        )));
    }
    if !has_extension(path, std::slice::from_ref(&extension)) {
        return Err(ResubError::InvalidPath(format!(
            "{} is not a {} file",
            path.display(),
            extension
        )));
    }
    if rules.is_empty() {
        return Err(ResubError::EmptyRuleSet(path.to_path_buf()));
    }

    let repacked = repackage_container(path, rules, options)?;
    let mut result = CmdResult::default().with_paths(vec![repacked.path.clone()]);
    result.add_message(file_message(&FileReport {
        path: repacked.path.clone(),
        status: FileStatus::Repacked(repacked.summary),
    }));
    result.add_message(CmdMessage::info(format!(
        "Saved as {}",
        repacked.path.display()
    )));
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use std::io::{Read, Write};
    use tempfile::TempDir;
    use zip::write::SimpleFileOptions;
    use zip::{ZipArchive, ZipWriter};

    #[test]
    fn test_repack_single_container() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("r.prpt");
        let mut zip = ZipWriter::new(File::create(&path).unwrap());
        zip.start_file("content.xml", SimpleFileOptions::default())
            .unwrap();
        zip.write_all(b"old").unwrap();
        zip.finish().unwrap();

        let result = run(
            &path,
            &RuleSet::parse("old => new"),
            ".prpt",
            RepackOptions::default(),
        )
        .unwrap();
        assert_eq!(result.paths, vec![path.clone()]);

        let mut archive = ZipArchive::new(File::open(&path).unwrap()).unwrap();
        let mut content = String::new();
        archive
            .by_name("content.xml")
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        assert_eq!(content, "new");
    }

    #[test]
    fn test_rejects_wrong_extension() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("r.zip");
        fs::write(&path, "x").unwrap();

        let err = run(
            &path,
            &RuleSet::parse("a => b"),
            "prpt",
            RepackOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ResubError::InvalidPath(_)));
        assert_eq!(fs::read(&path).unwrap(), b"x");
    }

    #[test]
    fn test_rejects_missing_file() {
        let temp = TempDir::new().unwrap();
        let err = run(
            &temp.path().join("gone.prpt"),
            &RuleSet::parse("a => b"),
            ".prpt",
            RepackOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ResubError::InvalidPath(_)));
    }

    #[test]
    fn test_rejects_empty_rules() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("r.prpt");
        fs::write(&path, "x").unwrap();

        let err = run(&path, &RuleSet::default(), ".prpt", RepackOptions::default()).unwrap_err();
        assert!(matches!(err, ResubError::EmptyRuleSet(_)));
    }
}
