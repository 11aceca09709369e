use serde::{Deserialize, Serialize};

use super::{OpResult, OperationId};
use crate::hashing::ContentHash;

/// Registro de una invocación a través de la cache: resultado + identidad de
/// entrada/salida. `cached` indica hit (la operación no se ejecutó).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invocation {
    pub operation: OperationId,
    pub result: OpResult,
    pub input_hash: ContentHash,
    pub output_hash: ContentHash,
    pub cached: bool,
    pub duration_ms: f64,
}
