//! Operaciones registrables: identificador tipado + callable puro.

use std::borrow::{Borrow, Cow};
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::OpResult;
use crate::determinism::DeterministicSource;
use crate::errors::OperationError;

/// Identificador estable de una operación registrada.
///
/// Las operaciones de dominio usan constantes (`OperationId::from_static`);
/// el registro acepta también ids dinámicos.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OperationId(Cow<'static, str>);

impl OperationId {
    pub const fn from_static(id: &'static str) -> Self {
        Self(Cow::Borrowed(id))
    }

    pub fn new(id: impl Into<String>) -> Self {
        Self(Cow::Owned(id.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OperationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for OperationId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&'static str> for OperationId {
    fn from(id: &'static str) -> Self {
        Self::from_static(id)
    }
}

impl From<String> for OperationId {
    fn from(id: String) -> Self {
        Self::new(id)
    }
}

/// Contexto entregado a `Operation::call`.
///
/// Toda fuente de no-determinismo (tiempo, aleatoriedad, uuids) debe pasar
/// por `values`.
#[derive(Debug, Clone)]
pub struct OpContext {
    operation: OperationId,
    values: Arc<DeterministicSource>,
}

impl OpContext {
    pub fn new(operation: OperationId, values: Arc<DeterministicSource>) -> Self {
        Self { operation, values }
    }

    pub fn operation(&self) -> &OperationId {
        &self.operation
    }

    pub fn values(&self) -> &DeterministicSource {
        &self.values
    }
}

/// Trait que define una operación. Implementaciones deben ser puras respecto
/// a `args` + el contexto determinista.
///
/// Devolver `Err` equivale a "lanzar": la cache lo traduce a un fallo
/// uniforme `{success: false, error, function}`. Un `OpResult` con
/// `success: false` es un fallo de dominio ordinario.
pub trait Operation: Send + Sync {
    fn call(&self, ctx: &OpContext, args: &[Value]) -> Result<OpResult, OperationError>;
}

impl<F> Operation for F where F: Fn(&OpContext, &[Value]) -> Result<OpResult, OperationError> + Send + Sync
{
    fn call(&self, ctx: &OpContext, args: &[Value]) -> Result<OpResult, OperationError> {
        self(ctx, args)
    }
}
