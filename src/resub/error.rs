use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ResubError {
    #[error("Rules file not found: {}", .0.display())]
    RuleSourceMissing(PathBuf),

    #[error("No substitution rules found in {}", .0.display())]
    EmptyRuleSet(PathBuf),

    #[error("Failed to extract {}: {source}", path.display())]
    ArchiveExtract {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("Failed to write archive {}: {source}", path.display())]
    ArchiveWrite {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("Failed to {op} {}: {source}", path.display())]
    Filesystem {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{source} (original content left at {})", staging.display())]
    Stranded {
        staging: PathBuf,
        #[source]
        source: Box<ResubError>,
    },

    #[error("Destination already exists: {}", .0.display())]
    DestinationExists(PathBuf),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),
}

impl ResubError {
    pub(crate) fn fs(op: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ResubError::Filesystem {
            op,
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, ResubError>;
