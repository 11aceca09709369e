//! Configuración central de la aplicación.
//! Carga variables de entorno (.env una sola vez) y construye las secciones
//! de cache, semilla, verificación y persistencia.
use std::env;
use std::str::FromStr;

use gen_core::{CacheConfig, SeedConfig, VerifierConfig};
use gen_persistence::PersistenceConfig;
use once_cell::sync::Lazy;

use crate::errors::OrchestratorError;

pub const MAX_CACHE_SIZE_ENV: &str = "GENFLOW_MAX_CACHE_SIZE";
pub const TRACE_CAPACITY_ENV: &str = "GENFLOW_TRACE_CAPACITY";
pub const CACHE_ENABLED_ENV: &str = "GENFLOW_CACHE_ENABLED";
pub const TRACING_ENV: &str = "GENFLOW_TRACING";
pub const VERIFY_PARALLEL_ENV: &str = "GENFLOW_VERIFY_PARALLEL";

/// Registros de ejecución de pipelines retenidos por defecto.
pub const DEFAULT_RUN_LOG_CAPACITY: usize = 1000;

static DOTENV_LOADED: Lazy<()> = Lazy::new(|| {
    let _ = dotenvy::dotenv();
});

/// Configuración global de la aplicación.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub cache: CacheConfig,
    /// La semilla se resuelve al primer uso (entorno, git o fallback).
    pub seed: SeedConfig,
    pub verifier: VerifierConfig,
    pub persistence: PersistenceConfig,
    pub run_log_capacity: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self { cache: CacheConfig::default(),
               seed: SeedConfig::default(),
               verifier: VerifierConfig::default(),
               persistence: PersistenceConfig::default(),
               run_log_capacity: DEFAULT_RUN_LOG_CAPACITY }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, OrchestratorError> {
        Lazy::force(&DOTENV_LOADED);
        let mut config = Self::from_lookup(|name| env::var(name).ok())?;
        config.persistence = PersistenceConfig::from_env();
        Ok(config)
    }

    /// Construye la configuración desde una función de búsqueda (el entorno
    /// en producción, un mapa en tests). Valores presentes pero inválidos son
    /// un error, no se ignoran.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, OrchestratorError>
        where F: Fn(&str) -> Option<String>
    {
        let defaults = Self::default();
        let cache = CacheConfig { enabled: flag(&lookup, CACHE_ENABLED_ENV, defaults.cache.enabled)?,
                                  tracing: flag(&lookup, TRACING_ENV, defaults.cache.tracing)?,
                                  max_cache_size: number(&lookup, MAX_CACHE_SIZE_ENV, defaults.cache.max_cache_size)?,
                                  trace_capacity: number(&lookup, TRACE_CAPACITY_ENV, defaults.cache.trace_capacity)? };
        // GENFLOW_STABLE_ID lo lee la propia fuente determinista al inicializarse.
        let verifier = VerifierConfig { parallel: flag(&lookup, VERIFY_PARALLEL_ENV, defaults.verifier.parallel)?,
                                        ..defaults.verifier };
        Ok(Self { cache,
                  verifier,
                  ..defaults })
    }

    pub fn with_stable_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.seed.stable_identifier = Some(identifier.into());
        self
    }
}

fn number<T, F>(lookup: &F, name: &str, default: T) -> Result<T, OrchestratorError>
    where T: FromStr,
          F: Fn(&str) -> Option<String>
{
    match lookup(name).filter(|v| !v.trim().is_empty()) {
        None => Ok(default),
        Some(raw) => raw.trim()
                        .parse()
                        .map_err(|_| OrchestratorError::Config(format!("{name}: número inválido '{raw}'"))),
    }
}

fn flag<F>(lookup: &F, name: &str, default: bool) -> Result<bool, OrchestratorError>
    where F: Fn(&str) -> Option<String>
{
    match lookup(name).map(|v| v.trim().to_ascii_lowercase()).as_deref() {
        None | Some("") => Ok(default),
        Some("1" | "true" | "yes" | "on") => Ok(true),
        Some("0" | "false" | "no" | "off") => Ok(false),
        Some(other) => Err(OrchestratorError::Config(format!("{name}: booleano inválido '{other}'"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let c = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(c, AppConfig::default());
    }

    #[test]
    fn reads_overrides() {
        let c = AppConfig::from_lookup(lookup(&[(MAX_CACHE_SIZE_ENV, "50"),
                                                (CACHE_ENABLED_ENV, "off"),
                                                (VERIFY_PARALLEL_ENV, "0")])).unwrap();
        assert_eq!(c.cache.max_cache_size, 50);
        assert!(!c.cache.enabled);
        assert!(!c.verifier.parallel);
        assert!(c.cache.tracing);
    }

    #[test]
    fn invalid_values_are_errors() {
        assert!(matches!(AppConfig::from_lookup(lookup(&[(TRACE_CAPACITY_ENV, "muchos")])),
                         Err(OrchestratorError::Config(_))));
        assert!(matches!(AppConfig::from_lookup(lookup(&[(TRACING_ENV, "quizas")])),
                         Err(OrchestratorError::Config(_))));
    }
}
