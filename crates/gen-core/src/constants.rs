//! Constantes del motor core.
//!
//! Algunas de estas constantes participan en hashes persistidos (snapshots de
//! cache). `ENGINE_VERSION` se guarda en cada snapshot y un snapshot con otra
//! versión es rechazado al importarse.

/// Versión lógica del motor. Cambiarla invalida snapshots exportados.
pub const ENGINE_VERSION: &str = "G1.0";

/// Máximo de entradas en la cache antes de aplicar eviction.
pub const DEFAULT_MAX_CACHE_SIZE: usize = 1000;

/// Capacidad por defecto del ring buffer de trazas.
pub const DEFAULT_TRACE_CAPACITY: usize = 10_000;

/// Fracción (en porcentaje) de entradas más antiguas eliminadas al superar
/// `max_cache_size`.
pub const EVICTION_PERCENT: usize = 20;

/// Identificador usado cuando no hay ninguna fuente estable disponible
/// (fuera de un repositorio git y sin variable de entorno).
pub const FALLBACK_STABLE_IDENTIFIER: &str = "genflow-deterministic-fallback";

/// Variable de entorno con el identificador estable explícito.
pub const STABLE_ID_ENV: &str = "GENFLOW_STABLE_ID";

/// Convención de reproducible-builds para fijar el timestamp de la época.
pub const SOURCE_DATE_EPOCH_ENV: &str = "SOURCE_DATE_EPOCH";

/// Base (2020-01-01T00:00:00Z) para timestamps derivados del identificador.
pub const DERIVED_EPOCH_BASE_SECS: i64 = 1_577_836_800;

/// Ventana (~10 años) sobre la base para timestamps derivados.
pub const DERIVED_EPOCH_SPAN_SECS: u64 = 315_360_000;
