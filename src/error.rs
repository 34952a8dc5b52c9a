use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GraphError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("collaboration dataset not found: {}", .0.display())]
    DatasetNotFound(PathBuf),

    #[error("collaboration dataset is empty: no artists found")]
    EmptyDataset,

    #[error("artist not found: {0}")]
    ArtistNotFound(String),

    #[error("ego degree must be between 1 and 5, got {0}")]
    InvalidDegree(u32),

    #[error("layout session is {actual}, expected {expected}")]
    SessionState {
        expected: &'static str,
        actual: &'static str,
    },

    #[error("no node with index {0} in the layout session")]
    UnknownNode(usize),

    #[error("request was cancelled")]
    Cancelled,

    #[error("I/O error: {source} (path: {})", path.display())]
    Io {
        source: std::io::Error,
        path: PathBuf,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, GraphError>;

impl GraphError {
    pub(crate) fn io(source: std::io::Error, path: impl Into<PathBuf>) -> Self {
        Self::Io {
            source,
            path: path.into(),
        }
    }
}
