use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::rules::RuleSet;
use std::path::Path;

pub fn run(rules: &RuleSet, source: &Path) -> Result<CmdResult> {
    let mut result = CmdResult::default().with_rules(rules.rules().to_vec());

    if rules.is_empty() {
        result.add_message(CmdMessage::warning(format!(
            "No substitution rules found in {}",
            source.display()
        )));
    } else {
        result.add_message(CmdMessage::info(format!(
            "{} rule(s) loaded from {}",
            rules.len(),
            source.display()
        )));
    }

    if rules.skipped_lines() > 0 {
        result.add_message(CmdMessage::warning(format!(
            "{} line(s) without '=>' were ignored",
            rules.skipped_lines()
        )));
    }

    Ok(result)
}
