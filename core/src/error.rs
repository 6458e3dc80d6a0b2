use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SearchError>;

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("corrupt index at {}: {reason}", path.display())]
    CorruptIndex { path: PathBuf, reason: String },

    #[error("index format version {found} does not match expected version {expected}")]
    VersionMismatch { found: u32, expected: u32 },

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl SearchError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }

    pub(crate) fn corrupt(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::CorruptIndex { path: path.into(), reason: reason.into() }
    }

    /// Whether the persisted index is unusable and has to be rebuilt.
    pub fn is_corrupt(&self) -> bool {
        matches!(self, Self::CorruptIndex { .. } | Self::VersionMismatch { .. })
    }
}
