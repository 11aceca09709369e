use gen_core::{arg, hash_value, OpContext, OpResult, Operation, OperationError, TypedPayload};
use serde_json::Value;

use crate::artifacts::HashedContent;

/// Hash canónico de un valor arbitrario.
#[derive(Debug, Clone, Copy, Default)]
pub struct HashContent;

impl Operation for HashContent {
    fn call(&self, _ctx: &OpContext, args: &[Value]) -> Result<OpResult, OperationError> {
        let value = arg(args, 0, "value")?;
        HashedContent { hash: hash_value(value).to_string() }.into_result()
    }
}
