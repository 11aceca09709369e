//! Cache de memoización direccionada por contenido.
//!
//! - La clave es `hash({operation, args})` sobre JSON canónico.
//! - Los fallos también se cachean: una operación pura falla igual cada vez.
//! - Eviction FIFO por creación (no LRU): superado `max_cache_size` se
//!   eliminan las entradas más antiguas (al menos el 20%). Un hit no
//!   rejuvenece la entrada.

mod config;
mod entry;
mod memo;
mod metrics;
mod registry;
mod snapshot;

pub use config::CacheConfig;
pub use entry::CacheEntry;
pub use memo::MemoCache;
pub use metrics::{CacheMetrics, MetricsSnapshot};
pub use registry::OperationRegistry;
pub use snapshot::{CacheSnapshot, SnapshotRecord};
