use crate::batch::scan_and_rewrite_plain_text;
use crate::commands::{batch_result, CmdResult};
use crate::error::Result;
use crate::rules::RuleSet;
use std::path::Path;

pub fn run<S: AsRef<str>>(root: &Path, rules: &RuleSet, extensions: &[S]) -> Result<CmdResult> {
    let report = scan_and_rewrite_plain_text(root, rules, extensions)?;
    let noun = extensions
        .iter()
        .map(|e| e.as_ref())
        .collect::<Vec<_>>()
        .join("/");
    Ok(batch_result(report, &noun))
}
