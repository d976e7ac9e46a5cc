use crate::batch::{BatchReport, FileReport, FileStatus};
use crate::config::ResubConfig;
use crate::rules::Rule;
use std::path::PathBuf;

pub mod config;
pub mod containers;
pub mod init;
pub mod repack;
pub mod rules;
pub mod text;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
pub struct CmdMessage {
    pub level: MessageLevel,
    pub content: String,
}

impl CmdMessage {
    pub fn info(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            content: content.into(),
        }
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Success,
            content: content.into(),
        }
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Warning,
            content: content.into(),
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Error,
            content: content.into(),
        }
    }
}

#[derive(Debug, Default)]
pub struct CmdResult {
    pub rules: Vec<Rule>,
    pub report: Option<BatchReport>,
    pub paths: Vec<PathBuf>,
    pub config: Option<ResubConfig>,
    pub messages: Vec<CmdMessage>,
}

impl CmdResult {
    pub fn add_message(&mut self, message: CmdMessage) {
        self.messages.push(message);
    }

    pub fn with_rules(mut self, rules: Vec<Rule>) -> Self {
        self.rules = rules;
        self
    }

    pub fn with_report(mut self, report: BatchReport) -> Self {
        self.report = Some(report);
        self
    }

    pub fn with_paths(mut self, paths: Vec<PathBuf>) -> Self {
        self.paths = paths;
        self
    }

    pub fn with_config(mut self, config: ResubConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn has_failures(&self) -> bool {
        self.report.as_ref().is_some_and(|r| r.failed() > 0)
            || self
                .messages
                .iter()
                .any(|m| m.level == MessageLevel::Error)
    }
}

pub(crate) fn file_message(file: &FileReport) -> CmdMessage {
    let path = file.path.display();
    match &file.status {
        FileStatus::Repacked(summary) if summary.modified > 0 => CmdMessage::success(format!(
            "Repacked: {} ({} of {} members changed, {} replacements)",
            path, summary.modified, summary.members, summary.replacements
        )),
        FileStatus::Repacked(summary) => CmdMessage::info(format!(
            "Repacked: {} (no matches in {} members)",
            path, summary.members
        )),
        FileStatus::Rewritten { replacements } => {
            CmdMessage::success(format!("Modified: {} ({} replacements)", path, replacements))
        }
        FileStatus::Unchanged => CmdMessage::info(format!("Unchanged: {}", path)),
        FileStatus::NotText => CmdMessage::warning(format!("Skipped (not text): {}", path)),
        FileStatus::Failed(reason) => CmdMessage::error(format!("Failed: {}: {}", path, reason)),
    }
}

pub(crate) fn batch_result(report: BatchReport, noun: &str) -> CmdResult {
    let mut result = CmdResult::default();

    if report.count() == 0 {
        result.add_message(CmdMessage::info(format!(
            "No {} files found under {}",
            noun,
            report.root.display()
        )));
        return result.with_report(report);
    }

    for file in &report.files {
        result.add_message(file_message(file));
    }

    let summary = format!(
        "{} {} files found, {} modified, {} failed",
        report.count(),
        noun,
        report.modified(),
        report.failed()
    );
    if report.failed() > 0 {
        result.add_message(CmdMessage::warning(summary));
    } else {
        result.add_message(CmdMessage::success(summary));
    }

    result.with_report(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repack::RepackSummary;

    fn report(files: Vec<FileReport>) -> BatchReport {
        BatchReport {
            root: PathBuf::from("/reports"),
            files,
        }
    }

    #[test]
    fn test_batch_result_empty() {
        let result = batch_result(report(vec![]), ".prpt");
        assert_eq!(result.messages.len(), 1);
        assert!(result.messages[0].content.contains("No .prpt files found"));
        assert!(!result.has_failures());
    }

    #[test]
    fn test_batch_result_reports_each_file_and_total() {
        let result = batch_result(
            report(vec![
                FileReport {
                    path: PathBuf::from("/reports/a.prpt"),
                    status: FileStatus::Repacked(RepackSummary {
                        members: 3,
                        modified: 1,
                        unchanged: 2,
                        not_text: 0,
                        replacements: 4,
                    }),
                },
                FileReport {
                    path: PathBuf::from("/reports/b.prpt"),
                    status: FileStatus::Failed("bad zip".into()),
                },
            ]),
            ".prpt",
        );

        assert_eq!(result.messages.len(), 3);
        assert_eq!(result.messages[0].level, MessageLevel::Success);
        assert_eq!(result.messages[1].level, MessageLevel::Error);
        assert_eq!(result.messages[2].level, MessageLevel::Warning);
        assert!(result.messages[2]
            .content
            .contains("2 .prpt files found, 1 modified, 1 failed"));
        assert!(result.has_failures());
    }
}
