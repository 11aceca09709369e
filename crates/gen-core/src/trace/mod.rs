//! Traza de ejecución y trait TraceStore.

mod store;
mod types;

pub use store::{InMemoryTraceStore, TraceStore};
pub use types::ExecutionTraceEntry;
