use gen_core::{arg, hash_str, OpContext, OpResult, Operation, OperationError, TypedPayload};
use serde_json::Value;

use crate::artifacts::{GeneratedArtifact, RenderedTemplate};

/// Empaqueta contenido renderizado como artefacto con nombre. Fecha e id
/// salen de la fuente determinista, así el artefacto es reproducible.
#[derive(Debug, Clone, Copy, Default)]
pub struct GenerateArtifact;

impl Operation for GenerateArtifact {
    fn call(&self, ctx: &OpContext, args: &[Value]) -> Result<OpResult, OperationError> {
        let content = match arg(args, 0, "rendered")? {
            Value::String(s) => s.clone(),
            other => RenderedTemplate::decode(other)?.content,
        };
        let name = arg(args, 1, "name")?.as_str()
                                        .ok_or_else(|| OperationError::invalid("name must be a string"))?;
        if name.trim().is_empty() {
            return Ok(OpResult::failure("artifact name is empty"));
        }
        let content_hash = hash_str(&content).to_string();
        let values = ctx.values();
        let artifact_id = values.uuid(&format!("artifact:{name}:{content_hash}")).to_string();
        GeneratedArtifact { name: name.to_string(),
                            content,
                            content_hash,
                            generated_at: values.timestamp().to_rfc3339(),
                            artifact_id }.into_result()
    }
}
