use std::process::Command;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::constants::{DERIVED_EPOCH_BASE_SECS, DERIVED_EPOCH_SPAN_SECS, FALLBACK_STABLE_IDENTIFIER, SOURCE_DATE_EPOCH_ENV,
                       STABLE_ID_ENV};
use crate::hashing::{digest_bytes, hash_str, ContentHash};

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum DeterminismError {
    #[error("invalid range: min {min} > max {max}")]
    InvalidRange { min: i64, max: i64 },
}

/// Origen del identificador estable usado para la semilla.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IdentifierSource {
    Explicit,
    Environment,
    Git,
    Fallback,
}

/// Configuración de la semilla.
///
/// Con `discover = false` sólo se usan los valores explícitos (y el fallback),
/// nunca el entorno ni git: útil en tests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedConfig {
    pub stable_identifier: Option<String>,
    pub epoch_override: Option<i64>,
    pub discover: bool,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self { stable_identifier: None,
               epoch_override: None,
               discover: true }
    }
}

impl SeedConfig {
    /// Semilla fija, sin descubrimiento.
    pub fn fixed(identifier: impl Into<String>) -> Self {
        Self { stable_identifier: Some(identifier.into()),
               epoch_override: None,
               discover: false }
    }

    pub fn with_epoch(mut self, epoch_secs: i64) -> Self {
        self.epoch_override = Some(epoch_secs);
        self
    }
}

/// Estado de la semilla para una época. Inmutable una vez creado.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedState {
    pub stable_identifier: String,
    pub identifier_source: IdentifierSource,
    pub derived_timestamp: DateTime<Utc>,
    pub seed: ContentHash,
}

impl SeedState {
    /// Resuelve identificador y timestamp según `config` y calcula la semilla.
    pub fn initialize(config: &SeedConfig) -> Self {
        let (identifier, source) = resolve_identifier(config);
        let timestamp = resolve_timestamp(config, &identifier, source);
        let state = Self::from_parts(identifier, source, timestamp);
        debug!(identifier = %state.stable_identifier,
               source = ?state.identifier_source,
               seed = state.seed.short(),
               "deterministic seed initialized");
        state
    }

    /// `seed = hash(identifier | epoch_secs)`.
    pub fn from_parts(stable_identifier: String, identifier_source: IdentifierSource, derived_timestamp: DateTime<Utc>) -> Self {
        let seed = hash_str(&format!("{}|{}", stable_identifier, derived_timestamp.timestamp()));
        Self { stable_identifier,
               identifier_source,
               derived_timestamp,
               seed }
    }

    fn digest(&self, context: &str) -> [u8; 32] {
        digest_bytes(format!("{}:{}", self.seed, context).as_bytes())
    }

    fn leading_u64(&self, context: &str) -> u64 {
        let d = self.digest(context);
        u64::from_be_bytes([d[0], d[1], d[2], d[3], d[4], d[5], d[6], d[7]])
    }

    /// Float en [0, 1) con 53 bits de precisión.
    pub fn random_float(&self, context: &str) -> f64 {
        let bits = self.leading_u64(context) >> 11;
        bits as f64 / (1u64 << 53) as f64
    }

    /// Entero en el rango inclusivo `[min, max]`.
    pub fn random_int(&self, min: i64, max: i64, context: &str) -> Result<i64, DeterminismError> {
        if min > max {
            return Err(DeterminismError::InvalidRange { min, max });
        }
        let span = (i128::from(max) - i128::from(min) + 1) as u128;
        let offset = u128::from(self.leading_u64(context)) % span;
        Ok((i128::from(min) + offset as i128) as i64)
    }

    /// String hex de longitud exacta `len`. Para longitudes > 64 se
    /// concatenan bloques `hash(seed:context#n)`.
    pub fn hex(&self, len: usize, context: &str) -> String {
        let mut out = String::with_capacity(len + 64);
        let mut block = 0u64;
        while out.len() < len {
            for b in self.digest(&format!("{context}#{block}")) {
                out.push_str(&format!("{b:02x}"));
            }
            block += 1;
        }
        out.truncate(len);
        out
    }

    /// UUID con layout v4 (bits de versión/variante) pero bytes derivados de la
    /// semilla.
    pub fn uuid(&self, context: &str) -> Uuid {
        let d = self.digest(context);
        let bytes: [u8; 16] = std::array::from_fn(|i| d[i]);
        uuid::Builder::from_random_bytes(bytes).into_uuid()
    }
}

fn resolve_identifier(config: &SeedConfig) -> (String, IdentifierSource) {
    if let Some(id) = config.stable_identifier.as_deref().filter(|s| !s.trim().is_empty()) {
        return (id.trim().to_string(), IdentifierSource::Explicit);
    }
    if config.discover {
        if let Some(id) = std::env::var(STABLE_ID_ENV).ok().filter(|s| !s.trim().is_empty()) {
            return (id.trim().to_string(), IdentifierSource::Environment);
        }
        if let Some(rev) = git_output(&["rev-parse", "HEAD"]) {
            return (rev, IdentifierSource::Git);
        }
    }
    (FALLBACK_STABLE_IDENTIFIER.to_string(), IdentifierSource::Fallback)
}

fn resolve_timestamp(config: &SeedConfig, identifier: &str, source: IdentifierSource) -> DateTime<Utc> {
    let secs = config.epoch_override
                     .or_else(|| config.discover.then(source_date_epoch).flatten())
                     .or_else(|| match source {
                         IdentifierSource::Git => git_output(&["show", "-s", "--format=%ct", identifier])
                             .and_then(|s| s.parse::<i64>().ok()),
                         _ => None,
                     })
                     .unwrap_or_else(|| derived_epoch(identifier));
    DateTime::<Utc>::from_timestamp(secs, 0).unwrap_or_default()
}

fn source_date_epoch() -> Option<i64> {
    std::env::var(SOURCE_DATE_EPOCH_ENV).ok().and_then(|v| v.trim().parse().ok())
}

fn derived_epoch(identifier: &str) -> i64 {
    let d = digest_bytes(identifier.as_bytes());
    let n = u64::from_be_bytes([d[0], d[1], d[2], d[3], d[4], d[5], d[6], d[7]]);
    DERIVED_EPOCH_BASE_SECS + (n % DERIVED_EPOCH_SPAN_SECS) as i64
}

fn git_output(args: &[&str]) -> Option<String> {
    let out = Command::new("git").args(args).output().ok()?;
    if !out.status.success() {
        return None;
    }
    let text = String::from_utf8(out.stdout).ok()?;
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_identifier_same_seed() {
        let a = SeedState::initialize(&SeedConfig::fixed("abc123"));
        let b = SeedState::initialize(&SeedConfig::fixed("abc123"));
        assert_eq!(a, b);
        assert_eq!(a.identifier_source, IdentifierSource::Explicit);
    }

    #[test]
    fn different_identifier_different_seed() {
        let a = SeedState::initialize(&SeedConfig::fixed("abc123"));
        let b = SeedState::initialize(&SeedConfig::fixed("abc124"));
        assert_ne!(a.seed, b.seed);
    }

    #[test]
    fn derived_timestamp_within_window() {
        let s = SeedState::initialize(&SeedConfig::fixed("rev-1"));
        let secs = s.derived_timestamp.timestamp();
        assert!(secs >= DERIVED_EPOCH_BASE_SECS);
        assert!(secs < DERIVED_EPOCH_BASE_SECS + DERIVED_EPOCH_SPAN_SECS as i64);
    }

    #[test]
    fn epoch_override_wins() {
        let s = SeedState::initialize(&SeedConfig::fixed("rev-1").with_epoch(1_700_000_000));
        assert_eq!(s.derived_timestamp.timestamp(), 1_700_000_000);
    }

    #[test]
    fn fallback_without_discovery() {
        let cfg = SeedConfig { stable_identifier: None,
                               epoch_override: None,
                               discover: false };
        let s = SeedState::initialize(&cfg);
        assert_eq!(s.stable_identifier, FALLBACK_STABLE_IDENTIFIER);
        assert_eq!(s.identifier_source, IdentifierSource::Fallback);
    }

    #[test]
    fn value_shapes() {
        let s = SeedState::initialize(&SeedConfig::fixed("shapes"));
        let f = s.random_float("f");
        assert!((0.0..1.0).contains(&f));
        for ctx in ["a", "b", "c", "d", "e"] {
            let n = s.random_int(-3, 3, ctx).unwrap();
            assert!((-3..=3).contains(&n));
        }
        assert_eq!(s.random_int(5, 5, "x").unwrap(), 5);
        assert!(s.random_int(i64::MIN, i64::MAX, "full").is_ok());
        assert_eq!(s.random_int(2, 1, "x"), Err(DeterminismError::InvalidRange { min: 2, max: 1 }));
        assert_eq!(s.hex(16, "h").len(), 16);
        assert_eq!(s.hex(150, "h").len(), 150);
        assert!(s.hex(150, "h").starts_with(&s.hex(16, "h")));
        let u = s.uuid("u");
        assert_eq!(u.get_version_num(), 4);
        assert_eq!(u.get_variant(), uuid::Variant::RFC4122);
    }

    #[test]
    fn contexts_do_not_collide() {
        let s = SeedState::initialize(&SeedConfig::fixed("ctx"));
        assert_ne!(s.uuid("site-a"), s.uuid("site-b"));
        assert_ne!(s.hex(32, "site-a"), s.hex(32, "site-b"));
        assert_eq!(s.uuid("site-a"), s.uuid("site-a"));
    }
}
