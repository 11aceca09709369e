//! GenFlow
//!
//! Librería central del motor de generación determinista:
//! - `workflow`: orquestador (catálogo de pipelines, ejecuciones,
//!   verificación de idempotencia, snapshots de cache).
//! - `config`: configuración desde el entorno (.env).
//! - `errors`: errores de la capa de aplicación.
//! - `hashing`: reexport de la canonicalización/hash de `gen-core`.
//! - `logging`: inicialización de `tracing`.
//!
//! Puede usarse desde `main.rs` o por otros crates/clientes.

pub mod config;
pub mod errors;
pub mod hashing;
pub mod logging;
pub mod workflow;

pub use config::AppConfig;
pub use errors::OrchestratorError;
pub use workflow::{Orchestrator, OrchestratorMetrics, PipelineCatalog, RunRecord};
