use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::model::OperationId;

/// Paso de pipeline: operación + argumentos fijos que siguen a la entrada.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineStep {
    pub operation: OperationId,
    #[serde(default)]
    pub static_args: Vec<Value>,
}

impl PipelineStep {
    pub fn new(operation: impl Into<OperationId>, static_args: Vec<Value>) -> Self {
        Self { operation: operation.into(),
               static_args }
    }

    /// Paso sin argumentos estáticos.
    pub fn op(operation: impl Into<OperationId>) -> Self {
        Self::new(operation, Vec::new())
    }

    /// Argumentos completos de la invocación: `input` + estáticos.
    pub fn args_with(&self, input: Value) -> Vec<Value> {
        let mut args = Vec::with_capacity(self.static_args.len() + 1);
        args.push(input);
        args.extend(self.static_args.iter().cloned());
        args
    }

    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        map.insert("operation".into(), Value::String(self.operation.to_string()));
        map.insert("static_args".into(), Value::Array(self.static_args.clone()));
        Value::Object(map)
    }
}
