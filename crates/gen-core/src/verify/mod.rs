//! Verificación de idempotencia.
//!
//! Cada repetición corre en un contexto aislado (cache y traza desactivadas,
//! fuente determinista nueva con la misma semilla). La cache principal no se
//! toca: ni entradas, ni traza, ni métricas.

mod verdict;
mod verifier;

pub use verdict::{IdempotencyDiagnosis, IdempotencyVerdict, RunRecord};
pub use verifier::{IdempotencyVerifier, VerificationTarget, VerifierConfig};
