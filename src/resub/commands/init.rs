use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::rules::write_example;
use std::path::Path;

pub fn run(rules_path: &Path) -> Result<CmdResult> {
    let mut result = CmdResult::default().with_paths(vec![rules_path.to_path_buf()]);
    if write_example(rules_path)? {
        result.add_message(CmdMessage::success(format!(
            "Created example rules file at {}",
            rules_path.display()
        )));
    } else {
        result.add_message(CmdMessage::info(format!(
            "Rules file already exists at {}",
            rules_path.display()
        )));
    }
    Ok(result)
}
