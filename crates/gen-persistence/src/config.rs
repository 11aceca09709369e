//! Configuración de persistencia desde variables de entorno.
//! Usa `GENFLOW_CACHE_PATH` (por defecto `.genflow/cache.json`).

use std::env;
use std::path::PathBuf;

use dotenvy::dotenv;
use once_cell::sync::Lazy;

pub const CACHE_PATH_ENV: &str = "GENFLOW_CACHE_PATH";
pub const DEFAULT_CACHE_PATH: &str = ".genflow/cache.json";

// Carga perezosa del archivo .env una sola vez.
static DOTENV_LOADED: Lazy<()> = Lazy::new(|| {
    let _ = dotenv(); // ignora error si no existe .env
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistenceConfig {
    pub cache_path: PathBuf,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self { cache_path: PathBuf::from(DEFAULT_CACHE_PATH) }
    }
}

impl PersistenceConfig {
    pub fn from_env() -> Self {
        Lazy::force(&DOTENV_LOADED);
        let cache_path = env::var(CACHE_PATH_ENV).ok()
                                                 .filter(|v| !v.trim().is_empty())
                                                 .map(PathBuf::from)
                                                 .unwrap_or_else(|| PathBuf::from(DEFAULT_CACHE_PATH));
        Self { cache_path }
    }
}

/// Forzar carga temprana de .env desde aplicaciones externas si se desea.
pub fn init_dotenv() {
    Lazy::force(&DOTENV_LOADED);
}
