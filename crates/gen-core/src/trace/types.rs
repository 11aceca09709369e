//! Entrada de traza de ejecución.
//!
//! Cada invocación a través de la cache (hit o miss) agrega una entrada
//! cuando el tracing está activo. Las entradas relacionan hash de entrada con
//! hash de salida (provenance).
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::hashing::ContentHash;
use crate::model::OperationId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionTraceEntry {
    pub seq: u64, // asignado por el store (orden append)
    pub operation: OperationId,
    pub input_hash: ContentHash,
    pub output_hash: ContentHash,
    pub cached: bool,
    pub timestamp: DateTime<Utc>, // metadato (no entra en ningún hash)
    pub duration_ms: f64,
}
