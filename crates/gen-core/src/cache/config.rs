use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_MAX_CACHE_SIZE, DEFAULT_TRACE_CAPACITY};

/// Parámetros de la cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Con `false` toda invocación ejecuta la operación y nada se guarda.
    pub enabled: bool,
    /// Registrar cada invocación en la traza.
    pub tracing: bool,
    pub max_cache_size: usize,
    pub trace_capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { enabled: true,
               tracing: true,
               max_cache_size: DEFAULT_MAX_CACHE_SIZE,
               trace_capacity: DEFAULT_TRACE_CAPACITY }
    }
}

impl CacheConfig {
    /// Configuración de los contextos de verificación: sin cache ni traza.
    pub fn isolated() -> Self {
        Self { enabled: false,
               tracing: false,
               max_cache_size: 0,
               trace_capacity: 0 }
    }
}
