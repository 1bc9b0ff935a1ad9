// Error taxonomy for the classification core.
//
// Every failure is raised at the point of detection and never retried
// internally. The binary wraps these in anyhow with extra context.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BizNewsError {
    /// Category name outside the closed set (or `Other` where a keyword
    /// category is required).
    #[error("invalid category: {0} (expected \"Negative_News\" or \"ESG_News\")")]
    InvalidCategory(String),

    /// Malformed argument: unknown method, bad input shape, zero n-gram width.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// An expected directory or file does not exist.
    #[error("missing resource: {}", .0.display())]
    MissingResource(PathBuf),

    /// Output path with an extension we cannot write.
    #[error("unsupported format: {0} (only .txt and .json are supported)")]
    UnsupportedFormat(String),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Embedding or tokenization backend failure.
    #[error("embedding backend error: {0}")]
    Embedding(String),
}

impl BizNewsError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn embedding(msg: impl std::fmt::Display) -> Self {
        Self::Embedding(msg.to_string())
    }
}

pub type Result<T> = std::result::Result<T, BizNewsError>;
