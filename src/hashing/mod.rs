// Reexport de la implementación única ubicada en `gen-core` para evitar
// duplicación de lógica de canonicalización/hashing a nivel de workspace.
pub use gen_core::hashing::{canonicalize, hash_str, hash_value, to_canonical_json, ContentHash};
