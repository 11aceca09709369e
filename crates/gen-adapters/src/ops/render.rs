use gen_core::{arg, hash_str, OpContext, OpResult, Operation, OperationError, TypedPayload};
use serde_json::{Map, Value};
use tera::{Context, Tera};
use tracing::debug;

use crate::artifacts::RenderedTemplate;

/// Render puntual con `tera`. El contexto es la entrada (sus claves al nivel
/// superior si es un objeto, y completa bajo `input`) más `build` con
/// timestamp, semilla e identificador de la fuente determinista.
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderTemplate;

impl Operation for RenderTemplate {
    fn call(&self, ctx: &OpContext, args: &[Value]) -> Result<OpResult, OperationError> {
        let input = arg(args, 0, "context")?;
        let template = arg(args, 1, "template")?.as_str()
                                               .ok_or_else(|| OperationError::invalid("template must be a string"))?;

        let mut root = match input {
            Value::Object(map) => map.clone(),
            _ => Map::new(),
        };
        root.insert("input".into(), input.clone());
        root.insert("build".into(), build_info(ctx));
        let context = Context::from_value(Value::Object(root)).map_err(|e| OperationError::invalid(error_chain(&e)))?;

        match Tera::one_off(template, &context, false) {
            Ok(content) => RenderedTemplate { content_hash: hash_str(&content).to_string(),
                                              content }.into_result(),
            Err(e) => {
                let msg = error_chain(&e);
                debug!(error = %msg, "template render failed");
                Ok(OpResult::failure(format!("template error: {msg}")))
            }
        }
    }
}

fn build_info(ctx: &OpContext) -> Value {
    let values = ctx.values();
    let mut build = Map::new();
    build.insert("timestamp".into(), Value::String(values.timestamp().to_rfc3339()));
    build.insert("seed".into(), Value::String(values.seed().to_string()));
    build.insert("identifier".into(), Value::String(values.stable_identifier().to_string()));
    Value::Object(build)
}

// tera anida la causa real en `source()`.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut msg = err.to_string();
    let mut cause = err.source();
    while let Some(c) = cause {
        msg.push_str(": ");
        msg.push_str(&c.to_string());
        cause = c.source();
    }
    msg
}

#[cfg(test)]
mod tests {
    use super::*;
    use gen_core::{DeterministicSource, OperationId};
    use serde_json::json;
    use std::sync::Arc;

    fn ctx() -> OpContext {
        OpContext::new(OperationId::from_static("render_template"),
                       Arc::new(DeterministicSource::with_identifier("render")))
    }

    #[test]
    fn renders_top_level_keys_and_build() {
        let r = RenderTemplate.call(&ctx(), &[json!({"name": "World"}), json!("Hello {{ name }} @ {{ build.identifier }}")])
                              .unwrap();
        assert!(r.success);
        assert_eq!(r.value["content"], json!("Hello World @ render"));
    }

    #[test]
    fn syntax_error_is_a_failure() {
        let r = RenderTemplate.call(&ctx(), &[json!({}), json!("{% for x in %}")]).unwrap();
        assert!(!r.success);
        assert!(r.error.unwrap().starts_with("template error"));
    }

    #[test]
    fn non_string_template_is_invalid() {
        assert!(RenderTemplate.call(&ctx(), &[json!({}), json!(3)]).is_err());
    }
}
