use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::hashing::{hash_value, ContentHash};
use crate::model::{OpResult, OperationId};

/// Registro de un paso ejecutado.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepRecord {
    pub index: usize,
    pub operation: OperationId,
    pub input_hash: ContentHash,
    pub output_hash: ContentHash,
    pub cached: bool,
    pub duration_ms: f64,
    pub result: OpResult,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedStep {
    pub index: usize,
    pub operation: OperationId,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineRunResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_result: Option<OpResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failed_step: Option<FailedStep>,
    /// Identificador de la ejecución (incluye el instante de inicio), no es
    /// clave de cache.
    pub pipeline_id: ContentHash,
    pub steps: Vec<StepRecord>,
    pub started_at: DateTime<Utc>,
    pub total_duration_ms: f64,
}

impl PipelineRunResult {
    pub fn cache_hits(&self) -> usize {
        self.steps.iter().filter(|s| s.cached).count()
    }

    /// Payload final (`null` si la ejecución falló).
    pub fn final_value(&self) -> &Value {
        self.final_result.as_ref().map(|r| &r.value).unwrap_or(&Value::Null)
    }

    /// Hash del resultado observable, sin metadatos de ejecución
    /// (`pipeline_id`, duraciones, timestamps).
    pub fn outcome_hash(&self) -> ContentHash {
        if let Some(result) = &self.final_result {
            return result.content_hash();
        }
        let mut map = Map::new();
        map.insert("success".into(), Value::Bool(self.success));
        if let Some(error) = &self.error {
            map.insert("error".into(), Value::String(error.clone()));
        }
        if let Some(step) = &self.failed_step {
            map.insert("failed_step".into(), Value::from(step.index));
            map.insert("operation".into(), Value::String(step.operation.to_string()));
        }
        hash_value(&Value::Object(map))
    }
}
