pub mod orchestrator_error;

pub use orchestrator_error::OrchestratorError;
