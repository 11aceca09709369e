//! Errores del core.
//!
//! Sólo los errores de programación cruzan la frontera cache/pipeline como
//! `Err`: operación no registrada, valor no hasheable, argumentos inválidos.
//! Los fallos esperados del dominio viajan como datos (`OpResult` con
//! `success: false`).

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub enum CoreError {
    #[error("operation not registered: {0}")]
    OperationNotRegistered(String),
    #[error("hashing contract violation: {0}")]
    HashingContractViolation(String),
    #[error("pipeline has no steps")]
    EmptyPipeline,
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("snapshot rejected: {0}")]
    SnapshotRejected(String),
    #[error("internal: {0}")]
    Internal(String),
}

/// Error "lanzado" por una operación registrada. El wrapper de la cache lo
/// convierte en un `OpResult` de fallo uniforme (nunca escapa como `Err`).
#[derive(Debug, Error, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub enum OperationError {
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),
    #[error("{0}")]
    Failed(String),
}

impl OperationError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArguments(msg.into())
    }

    pub fn failed(msg: impl Into<String>) -> Self {
        Self::Failed(msg.into())
    }
}
