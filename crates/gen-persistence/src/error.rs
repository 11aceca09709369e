//! Errores de persistencia.

use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("io error on {path}: {source}")]
    Io { path: String, source: io::Error },
    #[error("serialization: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("snapshot not found: {0}")]
    NotFound(String),
}

impl PersistenceError {
    pub(crate) fn io(path: &std::path::Path, source: io::Error) -> Self {
        Self::Io { path: path.display().to_string(),
                   source }
    }
}
