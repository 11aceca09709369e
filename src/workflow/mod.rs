//! Orquestación de pipelines sobre la cache de memoización.

pub mod catalog;
pub mod manager;
pub mod run_log;

pub use catalog::{PipelineCatalog, DIGEST_PIPELINE, GENERATE_PIPELINE, INGEST_PIPELINE};
pub use manager::{Orchestrator, OrchestratorMetrics};
pub use run_log::{RunLog, RunRecord};
