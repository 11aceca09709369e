//! Módulo de hashing y canonicalización JSON.

pub mod canonical_json;
pub mod hash;

pub use canonical_json::{canonicalize, to_canonical_json};
pub use hash::{digest_bytes, hash_serializable, hash_str, hash_value, ContentHash};
