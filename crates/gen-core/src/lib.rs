//! gen-core: sustrato determinista del pipeline de generación de artefactos.
//!
//! Componentes (de hoja a raíz):
//! - `hashing`: canonicalización JSON + SHA-256 (identidad de contenido).
//! - `determinism`: fuente de valores reproducibles (timestamp, random, uuid)
//!   derivados de un identificador estable.
//! - `cache`: memoización direccionada por contenido con eviction FIFO.
//! - `trace`: traza de ejecución acotada (ring buffer).
//! - `pipeline`: composición secuencial de operaciones memoizadas.
//! - `verify`: verificación de idempotencia en contextos aislados.
pub mod cache;
pub mod constants;
pub mod determinism;
pub mod errors;
pub mod hashing;
pub mod model;
pub mod pipeline;
pub mod trace;
pub mod verify;

pub use cache::{CacheConfig, CacheEntry, CacheSnapshot, MemoCache, MetricsSnapshot, OperationRegistry, SnapshotRecord};
pub use determinism::{DeterministicSource, IdentifierSource, SeedConfig, SeedState};
pub use errors::{CoreError, OperationError};
pub use hashing::{hash_str, hash_value, to_canonical_json, ContentHash};
pub use model::{arg, Invocation, OpContext, OpResult, Operation, OperationId, TypedPayload};
pub use pipeline::{FailedStep, Invoker, Pipeline, PipelineRunResult, PipelineStep, StepRecord};
pub use trace::{ExecutionTraceEntry, InMemoryTraceStore, TraceStore};
pub use verify::{IdempotencyDiagnosis, IdempotencyVerdict, IdempotencyVerifier, RunRecord, VerificationTarget, VerifierConfig};
