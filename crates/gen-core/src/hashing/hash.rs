//! Hash helpers: SHA-256 sobre la forma canónica.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

use super::canonical_json::to_canonical_json;
use crate::errors::CoreError;

/// Digest hex (64 chars, minúsculas) de un valor canónico. Única clave de la
/// cache.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentHash(String);

impl ContentHash {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Prefijo corto para logs.
    pub fn short(&self) -> &str {
        self.0.get(..12).unwrap_or(&self.0)
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ContentHash {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Digest crudo de 32 bytes.
pub fn digest_bytes(input: &[u8]) -> [u8; 32] {
    let mut out = [0u8; 32];
    out.copy_from_slice(&Sha256::digest(input));
    out
}

/// Hashea un string y devuelve hex.
pub fn hash_str(input: &str) -> ContentHash {
    ContentHash(format!("{:x}", Sha256::digest(input.as_bytes())))
}

/// Hash del JSON canónico de `value`. Total para cualquier `Value`.
pub fn hash_value(value: &Value) -> ContentHash {
    hash_str(&to_canonical_json(value))
}

/// Hash de cualquier tipo serializable. Falla si el valor no puede
/// representarse como JSON (p.ej. mapas con claves no string).
pub fn hash_serializable<T: Serialize + ?Sized>(value: &T) -> Result<ContentHash, CoreError> {
    let v = serde_json::to_value(value).map_err(|e| CoreError::HashingContractViolation(e.to_string()))?;
    Ok(hash_value(&v))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    #[test]
    fn sha256_of_known_string() {
        assert_eq!(hash_str("abc").as_str(),
                   "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad");
    }

    #[test]
    fn key_order_does_not_change_hash() {
        assert_eq!(hash_value(&json!({"b": 2, "a": 1})), hash_value(&json!({"a": 1, "b": 2})));
    }

    #[test]
    fn structurally_different_values_differ() {
        assert_ne!(hash_value(&json!({"a": 1})), hash_value(&json!({"a": "1"})));
        assert_ne!(hash_value(&json!([1, 2])), hash_value(&json!([2, 1])));
    }

    #[test]
    fn non_string_keys_violate_contract() {
        let mut m: HashMap<(u8, u8), u8> = HashMap::new();
        m.insert((1, 2), 3);
        let err = hash_serializable(&m).unwrap_err();
        assert!(matches!(err, CoreError::HashingContractViolation(_)));
    }

    #[test]
    fn short_prefix() {
        assert_eq!(hash_str("abc").short(), "ba7816bf8f01");
    }
}
