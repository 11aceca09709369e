use gen_core::CoreError;
use gen_persistence::PersistenceError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error("Error de persistencia: {0}")]
    Persistence(#[from] PersistenceError),
    #[error("Pipeline desconocido: {0}")]
    UnknownPipeline(String),
    #[error("Error de configuración: {0}")]
    Config(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_errors_are_transparent() {
        let err: OrchestratorError = CoreError::EmptyPipeline.into();
        assert_eq!(err.to_string(), "pipeline has no steps");
    }

    #[test]
    fn unknown_pipeline_format() {
        let err = OrchestratorError::UnknownPipeline("nada".into());
        assert_eq!(err.to_string(), "Pipeline desconocido: nada");
    }

    #[test]
    fn config_variant_format() {
        let err = OrchestratorError::Config("mala configuración".into());
        assert_eq!(err.to_string(), "Error de configuración: mala configuración");
    }
}
