// search-core/src/error.rs
//! Error types

use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A content directory could not be listed or read.
    #[error("failed to load content from {path:?}: {source}")]
    ContentLoad {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid glob pattern for {path:?}: {source}")]
    Pattern {
        path: PathBuf,
        #[source]
        source: glob::PatternError,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A search backend (local worker or remote service) did not answer.
    #[error("search backend failed: {0}")]
    Backend(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn content_load(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ContentLoad {
            path: path.into(),
            source,
        }
    }

    /// Whether the error came from the content store rather than from setup.
    pub fn is_content_load(&self) -> bool {
        matches!(self, Self::ContentLoad { .. } | Self::Pattern { .. })
    }
}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Self::InvalidConfig(e.to_string())
    }
}
