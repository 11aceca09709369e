use serde_json::Value;

use crate::cache::MemoCache;
use crate::errors::CoreError;
use crate::model::Invocation;

/// Lo que el pipeline necesita de una cache: invocar por id. Permite al
/// verificador sustituir la cache principal por contextos aislados.
pub trait Invoker: Send + Sync {
    fn invoke(&self, operation: &str, args: &[Value]) -> Result<Invocation, CoreError>;
}

impl Invoker for MemoCache {
    fn invoke(&self, operation: &str, args: &[Value]) -> Result<Invocation, CoreError> {
        MemoCache::invoke(self, operation, args)
    }
}
