use std::fs;
use std::io::ErrorKind;

use gen_core::{arg, hash_str, OpContext, OpResult, Operation, OperationError, TypedPayload};
use serde_json::Value;
use tracing::debug;

use crate::artifacts::FileContent;

/// Lee un archivo de texto UTF-8. Se memoiza por ruta: cambios posteriores
/// del archivo no se ven mientras la entrada siga en la cache.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReadFile;

impl Operation for ReadFile {
    fn call(&self, _ctx: &OpContext, args: &[Value]) -> Result<OpResult, OperationError> {
        let path = arg(args, 0, "path")?.as_str()
                                        .ok_or_else(|| OperationError::invalid("path must be a string"))?;
        match fs::read_to_string(path) {
            Ok(content) => FileContent { path: path.to_string(),
                                         size: content.len() as u64,
                                         content_hash: hash_str(&content).to_string(),
                                         content }.into_result(),
            Err(e) => {
                debug!(path, error = %e, "read_file failed");
                if e.kind() == ErrorKind::NotFound {
                    Ok(OpResult::failure(format!("file not found: {path}")))
                } else {
                    Ok(OpResult::failure(format!("cannot read {path}: {e}")))
                }
            }
        }
    }
}
