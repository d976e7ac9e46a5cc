use crate::batch::scan_and_repackage_containers;
use crate::commands::{batch_result, CmdResult};
use crate::error::Result;
use crate::repack::RepackOptions;
use crate::rules::RuleSet;
use crate::scan::normalize_ext;
use std::path::Path;

pub fn run(
    root: &Path,
    rules: &RuleSet,
    extension: &str,
    options: RepackOptions,
) -> Result<CmdResult> {
    let extension = normalize_ext(extension);
    let report = scan_and_repackage_containers(root, rules, &extension, options)?;
    Ok(batch_result(report, &extension))
}
