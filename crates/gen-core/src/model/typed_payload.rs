//! Infraestructura opcional de tipado fuerte para payloads de operaciones.
//! Las operaciones reciben y devuelven `serde_json::Value`; este trait permite
//! describir el payload con un tipo concreto sin que el core conozca la
//! semántica del dominio.

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use super::OpResult;
use crate::errors::OperationError;

/// Especificación abstracta de un payload tipado.
pub trait TypedPayload: Sized + Serialize + DeserializeOwned {
    /// Nombre del payload (aparece en mensajes de error).
    const KIND: &'static str;

    /// Validación semántica ligera (sin efectos secundarios). Opcional.
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }

    /// Serializa como `OpResult` exitoso.
    fn into_result(self) -> Result<OpResult, OperationError> {
        let value = serde_json::to_value(&self).map_err(|e| {
                                                   OperationError::failed(format!("{}: serialize: {e}", Self::KIND))
                                               })?;
        Ok(OpResult::ok(value))
    }

    /// Decodifica desde el payload neutro y aplica `validate`.
    fn decode(value: &Value) -> Result<Self, OperationError> {
        let decoded: Self = serde_json::from_value(value.clone()).map_err(|e| {
                                                                    OperationError::invalid(format!("{}: {e}", Self::KIND))
                                                                })?;
        decoded.validate()
               .map_err(|e| OperationError::invalid(format!("{}: {e}", Self::KIND)))?;
        Ok(decoded)
    }
}

/// Argumento posicional `index` o error de argumentos.
pub fn arg<'a>(args: &'a [Value], index: usize, name: &str) -> Result<&'a Value, OperationError> {
    args.get(index)
        .ok_or_else(|| OperationError::invalid(format!("missing argument #{index} ({name})")))
}
