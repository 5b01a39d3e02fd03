use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by the track store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Track not found: {0}")]
    NotFound(String),

    #[error("I/O error on {path:?}: {source}")]
    Persistence {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize catalog: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Corrupt catalog file {path:?}: {reason}")]
    CorruptStore { path: PathBuf, reason: String },
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> StoreError {
        let path = path.into();
        move |source| StoreError::Persistence { path, source }
    }
}
