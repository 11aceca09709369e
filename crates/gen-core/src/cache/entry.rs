use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::hashing::ContentHash;
use crate::model::{OpResult, OperationId};

/// Entrada de la cache. Se crea en el primer miss de un `input_hash` y no se
/// modifica nunca (sólo se elimina por eviction o reset).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub operation: OperationId,
    pub input_hash: ContentHash,
    pub output_hash: ContentHash,
    pub result: OpResult,
    pub created_at: DateTime<Utc>,
    pub execution_duration_ms: f64,
    /// Orden de creación; define qué entradas son "las más antiguas".
    pub seq: u64,
}
