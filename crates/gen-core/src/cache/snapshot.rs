//! Snapshot exportable del estado de la cache.
//!
//! Formato JSON elegido por la implementación; no es estable entre versiones
//! del motor (`engine_version` distinto => el import se rechaza).
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::MetricsSnapshot;
use crate::hashing::ContentHash;
use crate::model::{OpResult, OperationId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotRecord {
    pub operation: OperationId,
    pub input_hash: ContentHash,
    pub output_hash: ContentHash,
    pub result: OpResult,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub execution_duration_ms: f64,
}

/// Lista plana de registros en orden de creación + métricas agregadas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheSnapshot {
    pub engine_version: String,
    /// Semilla de la época que produjo los registros. Resultados que
    /// dependen de la fuente determinista sólo valen bajo la misma semilla.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<ContentHash>,
    pub exported_at: DateTime<Utc>,
    pub records: Vec<SnapshotRecord>,
    pub metrics: MetricsSnapshot,
}

impl CacheSnapshot {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
