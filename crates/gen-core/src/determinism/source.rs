use chrono::{DateTime, Utc};
use once_cell::sync::OnceCell;
use uuid::Uuid;

use super::seed::{DeterminismError, SeedConfig, SeedState};
use crate::hashing::ContentHash;

/// Fuente de valores deterministas inyectada explícitamente (no hay
/// singleton global). Las consultas usan `&self`; la época se inicializa en
/// la primera consulta y queda fija hasta `reset`/`initialize`.
#[derive(Debug, Default)]
pub struct DeterministicSource {
    config: SeedConfig,
    state: OnceCell<SeedState>,
}

impl DeterministicSource {
    pub fn new(config: SeedConfig) -> Self {
        Self { config,
               state: OnceCell::new() }
    }

    /// Atajo para una semilla fija sin descubrimiento (tests, verificación).
    pub fn with_identifier(identifier: impl Into<String>) -> Self {
        Self::new(SeedConfig::fixed(identifier))
    }

    /// Fuente nueva con la misma configuración y sin estado. Misma
    /// configuración implica misma semilla.
    pub fn fresh(&self) -> Self {
        Self::new(self.config.clone())
    }

    pub fn config(&self) -> &SeedConfig {
        &self.config
    }

    /// Abre una época nueva. Con `Some(id)` el identificador pasa a ser
    /// explícito para esta y las siguientes épocas.
    pub fn initialize(&mut self, identifier: Option<&str>) -> &SeedState {
        if let Some(id) = identifier {
            self.config.stable_identifier = Some(id.to_string());
        }
        self.state = OnceCell::new();
        self.state()
    }

    /// Descarta la época actual; la siguiente consulta la recalcula.
    pub fn reset(&mut self) {
        self.state = OnceCell::new();
    }

    pub fn is_initialized(&self) -> bool {
        self.state.get().is_some()
    }

    pub fn state(&self) -> &SeedState {
        self.state.get_or_init(|| SeedState::initialize(&self.config))
    }

    pub fn seed(&self) -> &ContentHash {
        &self.state().seed
    }

    pub fn stable_identifier(&self) -> &str {
        &self.state().stable_identifier
    }

    /// Timestamp constante durante toda la época (no avanza con el reloj).
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.state().derived_timestamp
    }

    pub fn random_float(&self, context: &str) -> f64 {
        self.state().random_float(context)
    }

    pub fn random_int(&self, min: i64, max: i64, context: &str) -> Result<i64, DeterminismError> {
        self.state().random_int(min, max, context)
    }

    pub fn hex(&self, len: usize, context: &str) -> String {
        self.state().hex(len, context)
    }

    pub fn uuid(&self, context: &str) -> Uuid {
        self.state().uuid(context)
    }
}
