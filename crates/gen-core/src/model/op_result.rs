//! Resultado uniforme de una operación.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::hashing::{hash_value, ContentHash};

/// Resultado de una operación: como mínimo un flag `success`.
///
/// - `value`: payload (se omite en JSON cuando es `null`).
/// - `error`: descripción del fallo.
/// - `function`: operación que falló, sólo en fallos generados por la cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub value: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function: Option<String>,
}

impl OpResult {
    pub fn ok(value: Value) -> Self {
        Self { success: true,
               value,
               error: None,
               function: None }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self { success: false,
               value: Value::Null,
               error: Some(error.into()),
               function: None }
    }

    /// Fallo uniforme producido por el wrapper de la cache.
    pub fn failed_in(function: &str, error: impl Into<String>) -> Self {
        Self { function: Some(function.to_string()),
               ..Self::failure(error) }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    /// Forma JSON (misma que produce serde) construida sin pasar por el
    /// serializer, así es infalible.
    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        map.insert("success".into(), Value::Bool(self.success));
        if !self.value.is_null() {
            map.insert("value".into(), self.value.clone());
        }
        if let Some(e) = &self.error {
            map.insert("error".into(), Value::String(e.clone()));
        }
        if let Some(f) = &self.function {
            map.insert("function".into(), Value::String(f.clone()));
        }
        Value::Object(map)
    }

    pub fn content_hash(&self) -> ContentHash {
        hash_value(&self.to_value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn to_value_matches_serde() {
        let ok = OpResult::ok(json!(49));
        assert_eq!(ok.to_value(), serde_json::to_value(&ok).unwrap());
        assert_eq!(ok.to_value(), json!({"success": true, "value": 49}));

        let f = OpResult::failed_in("square", "boom");
        assert_eq!(f.to_value(), serde_json::to_value(&f).unwrap());
        assert_eq!(f.to_value(), json!({"success": false, "error": "boom", "function": "square"}));
    }

    #[test]
    fn deserializes_minimal_shape() {
        let r: OpResult = serde_json::from_value(json!({"success": true})).unwrap();
        assert!(r.is_success());
        assert!(r.value.is_null());
    }
}
