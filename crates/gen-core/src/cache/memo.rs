use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::{CacheConfig, CacheEntry, CacheMetrics, CacheSnapshot, MetricsSnapshot, OperationRegistry, SnapshotRecord};
use crate::constants::{ENGINE_VERSION, EVICTION_PERCENT};
use crate::determinism::DeterministicSource;
use crate::errors::{CoreError, OperationError};
use crate::hashing::{hash_value, ContentHash};
use crate::model::{Invocation, OpContext, OpResult, Operation, OperationId};
use crate::trace::{ExecutionTraceEntry, InMemoryTraceStore, TraceStore};

/// Cache de memoización. `invoke` toma `&self` y es seguro entre hilos;
/// registrar operaciones, `reset` y cambiar la semilla requieren `&mut self`.
#[derive(Debug)]
pub struct MemoCache {
    registry: OperationRegistry,
    entries: DashMap<ContentHash, CacheEntry>,
    trace: InMemoryTraceStore,
    metrics: CacheMetrics,
    config: CacheConfig,
    values: Arc<DeterministicSource>,
    next_seq: AtomicU64,
    eviction: Mutex<()>,
}

impl Default for MemoCache {
    fn default() -> Self {
        Self::new(CacheConfig::default(), DeterministicSource::default())
    }
}

impl MemoCache {
    pub fn new(config: CacheConfig, values: DeterministicSource) -> Self {
        Self::with_registry(OperationRegistry::new(), config, values)
    }

    pub fn with_registry(registry: OperationRegistry, config: CacheConfig, values: DeterministicSource) -> Self {
        let trace_capacity = if config.tracing { config.trace_capacity } else { 0 };
        Self { registry,
               entries: DashMap::new(),
               trace: InMemoryTraceStore::with_capacity(trace_capacity),
               metrics: CacheMetrics::default(),
               config,
               values: Arc::new(values),
               next_seq: AtomicU64::new(0),
               eviction: Mutex::new(()) }
    }

    /// Cache hermana para verificación: mismo registro, sin cache ni traza y
    /// con una fuente determinista nueva (misma configuración de semilla).
    pub fn isolated(&self) -> Self {
        Self::with_registry(self.registry.clone(), CacheConfig::isolated(), self.values.fresh())
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub fn registry(&self) -> &OperationRegistry {
        &self.registry
    }

    pub fn values(&self) -> &DeterministicSource {
        &self.values
    }

    /// Reemplaza la fuente determinista (nueva época). La clave de cache no
    /// incluye la semilla, así que las entradas existentes se descartan.
    pub fn set_values(&mut self, values: DeterministicSource) {
        self.values = Arc::new(values);
        self.entries.clear();
    }

    /// Registra (o reemplaza) una operación.
    pub fn register<O>(&mut self, id: impl Into<OperationId>, op: O) -> Option<Arc<dyn Operation>>
        where O: Operation + 'static
    {
        self.register_arc(id.into(), Arc::new(op))
    }

    /// Variante para closures, fija la firma para que la inferencia funcione.
    pub fn register_fn<F>(&mut self, id: impl Into<OperationId>, f: F) -> Option<Arc<dyn Operation>>
        where F: Fn(&OpContext, &[Value]) -> Result<OpResult, OperationError> + Send + Sync + 'static
    {
        self.register_arc(id.into(), Arc::new(f))
    }

    /// Al reemplazar un binding se descartan sus entradas: la clave de cache
    /// identifica la operación por nombre, no por implementación.
    pub fn register_arc(&mut self, id: OperationId, op: Arc<dyn Operation>) -> Option<Arc<dyn Operation>> {
        let previous = self.registry.register(id.clone(), op);
        if previous.is_some() {
            let before = self.entries.len();
            self.entries.retain(|_, e| e.operation != id);
            warn!(operation = %id,
                  dropped = before - self.entries.len(),
                  "operation re-registered, previous binding replaced");
        }
        previous
    }

    /// Hash de entrada de una invocación: `hash({"operation", "args"})`.
    pub fn input_hash(operation: &str, args: &[Value]) -> ContentHash {
        let mut key = Map::new();
        key.insert("operation".into(), Value::String(operation.to_string()));
        key.insert("args".into(), Value::Array(args.to_vec()));
        hash_value(&Value::Object(key))
    }

    pub fn invoke(&self, id: &str, args: &[Value]) -> Result<Invocation, CoreError> {
        let (op_id, op) = self.registry
                              .get_full(id)
                              .ok_or_else(|| CoreError::OperationNotRegistered(id.to_string()))?;
        let input_hash = Self::input_hash(op_id.as_str(), args);

        if self.config.enabled {
            if let Some(entry) = self.entries.get(&input_hash) {
                let invocation = Invocation { operation: op_id.clone(),
                                              result: entry.result.clone(),
                                              input_hash: input_hash.clone(),
                                              output_hash: entry.output_hash.clone(),
                                              cached: true,
                                              duration_ms: 0.0 };
                drop(entry);
                self.metrics.record_hit();
                debug!(operation = %op_id, input = input_hash.short(), "cache hit");
                self.record_trace(&invocation);
                return Ok(invocation);
            }
        }

        let ctx = OpContext::new(op_id.clone(), Arc::clone(&self.values));
        let started = Instant::now();
        let result = match op.call(&ctx, args) {
            Ok(result) => result,
            Err(err) => {
                debug!(operation = %op_id, error = %err, "operation raised");
                OpResult::failed_in(op_id.as_str(), err.to_string())
            }
        };
        let duration_ms = started.elapsed().as_secs_f64() * 1000.0;
        let output_hash = result.content_hash();
        self.metrics.record_miss(duration_ms);
        debug!(operation = %op_id, input = input_hash.short(), output = output_hash.short(), duration_ms, "cache miss");

        let mut invocation = Invocation { operation: op_id.clone(),
                                          result,
                                          input_hash,
                                          output_hash,
                                          cached: false,
                                          duration_ms };
        if self.config.enabled {
            self.store(&mut invocation);
            self.evict_if_needed();
        }
        self.record_trace(&invocation);
        Ok(invocation)
    }

    // Si otro hilo guardó antes el mismo input_hash, gana el valor guardado.
    fn store(&self, invocation: &mut Invocation) {
        match self.entries.entry(invocation.input_hash.clone()) {
            Entry::Occupied(existing) => {
                let existing = existing.get();
                invocation.result = existing.result.clone();
                invocation.output_hash = existing.output_hash.clone();
            }
            Entry::Vacant(slot) => {
                slot.insert(CacheEntry { operation: invocation.operation.clone(),
                                         input_hash: invocation.input_hash.clone(),
                                         output_hash: invocation.output_hash.clone(),
                                         result: invocation.result.clone(),
                                         created_at: Utc::now(),
                                         execution_duration_ms: invocation.duration_ms,
                                         seq: self.next_seq.fetch_add(1, Ordering::SeqCst) });
            }
        }
    }

    fn record_trace(&self, invocation: &Invocation) {
        if self.config.tracing {
            self.trace.append(invocation);
        }
    }

    /// Elimina las entradas más antiguas por `created_at` (desempate por
    /// `seq`): `max(len - max, ceil(len * 20%))`.
    fn evict_if_needed(&self) -> usize {
        let max = self.config.max_cache_size;
        if self.entries.len() <= max {
            return 0;
        }
        let _guard = self.eviction.lock().unwrap_or_else(PoisonError::into_inner);
        let len = self.entries.len();
        if len <= max {
            return 0;
        }
        let count = (len - max).max((len * EVICTION_PERCENT).div_ceil(100));
        let mut by_age: Vec<(DateTime<Utc>, u64, ContentHash)> =
            self.entries.iter().map(|e| (e.created_at, e.seq, e.key().clone())).collect();
        by_age.sort_unstable_by(|a, b| (a.0, a.1).cmp(&(b.0, b.1)));
        for (_, _, key) in by_age.iter().take(count) {
            self.entries.remove(key);
        }
        warn!(evicted = count, remaining = self.entries.len(), max, "cache eviction");
        count
    }

    pub fn get(&self, input_hash: &ContentHash) -> Option<CacheEntry> {
        self.entries.get(input_hash).map(|e| e.value().clone())
    }

    pub fn contains(&self, input_hash: &ContentHash) -> bool {
        self.entries.contains_key(input_hash)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entradas en orden de creación.
    pub fn entries(&self) -> Vec<CacheEntry> {
        let mut all: Vec<CacheEntry> = self.entries.iter().map(|e| e.value().clone()).collect();
        all.sort_by(|a, b| (a.created_at, a.seq).cmp(&(b.created_at, b.seq)));
        all
    }

    pub fn trace(&self) -> &InMemoryTraceStore {
        &self.trace
    }

    /// Últimas `limit` entradas de traza.
    pub fn recent_trace(&self, limit: usize) -> Vec<ExecutionTraceEntry> {
        self.trace.recent(limit)
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    pub fn record_idempotency_violation(&self) {
        self.metrics.record_idempotency_violation();
    }

    pub fn export_state(&self) -> CacheSnapshot {
        let records = self.entries()
                          .into_iter()
                          .map(|e| SnapshotRecord { operation: e.operation,
                                                    input_hash: e.input_hash,
                                                    output_hash: e.output_hash,
                                                    result: e.result,
                                                    timestamp: e.created_at,
                                                    execution_duration_ms: e.execution_duration_ms })
                          .collect();
        CacheSnapshot { engine_version: ENGINE_VERSION.to_string(),
                        seed: Some(self.values.seed().clone()),
                        exported_at: Utc::now(),
                        records,
                        metrics: self.metrics() }
    }

    /// Importa un snapshot. Se valida entero antes de tocar la cache:
    /// versión del motor, semilla y `output_hash == hash(result)` en cada
    /// registro.
    /// Las entradas ya presentes se conservan y los contadores del snapshot se
    /// suman a los actuales. Devuelve cuántas se agregaron.
    pub fn import_state(&self, snapshot: &CacheSnapshot) -> Result<usize, CoreError> {
        if snapshot.engine_version != ENGINE_VERSION {
            return Err(CoreError::SnapshotRejected(format!("engine version {} (expected {ENGINE_VERSION})",
                                                           snapshot.engine_version)));
        }
        if let Some(seed) = snapshot.seed.as_ref().filter(|s| *s != self.values.seed()) {
            return Err(CoreError::SnapshotRejected(format!("seed {} does not match current epoch {}",
                                                           seed.short(),
                                                           self.values.seed().short())));
        }
        if let Some(bad) = snapshot.records.iter().find(|r| r.result.content_hash() != r.output_hash) {
            return Err(CoreError::SnapshotRejected(format!("output hash mismatch for {} ({})",
                                                           bad.operation,
                                                           bad.input_hash.short())));
        }

        let mut inserted = 0;
        for record in &snapshot.records {
            if let Entry::Vacant(slot) = self.entries.entry(record.input_hash.clone()) {
                slot.insert(CacheEntry { operation: record.operation.clone(),
                                         input_hash: record.input_hash.clone(),
                                         output_hash: record.output_hash.clone(),
                                         result: record.result.clone(),
                                         created_at: record.timestamp,
                                         execution_duration_ms: record.execution_duration_ms,
                                         seq: self.next_seq.fetch_add(1, Ordering::SeqCst) });
                inserted += 1;
            }
        }
        self.metrics.merge(&snapshot.metrics);
        self.evict_if_needed();
        debug!(inserted, total = self.entries.len(), "cache state imported");
        Ok(inserted)
    }

    /// Limpia entradas, traza y contadores juntos.
    pub fn reset(&mut self) {
        self.entries.clear();
        self.trace.clear();
        self.metrics.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::AtomicUsize;

    fn square_cache() -> (MemoCache, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let mut cache = MemoCache::new(CacheConfig::default(), DeterministicSource::with_identifier("test"));
        cache.register_fn("square", move |_ctx, args| {
                 counter.fetch_add(1, Ordering::SeqCst);
                 let n = args.first()
                             .and_then(Value::as_i64)
                             .ok_or_else(|| OperationError::invalid("expected integer"))?;
                 Ok(OpResult::ok(json!(n * n)))
             });
        (cache, calls)
    }

    #[test]
    fn square_scenario() {
        let (cache, calls) = square_cache();
        let first = cache.invoke("square", &[json!(7)]).unwrap();
        assert!(!first.cached);
        assert_eq!(first.result.value, json!(49));
        let second = cache.invoke("square", &[json!(7)]).unwrap();
        assert!(second.cached);
        assert_eq!(second.result, first.result);
        assert_eq!(second.output_hash, first.output_hash);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let m = cache.metrics();
        assert_eq!(m.total_operations, 2);
        assert_eq!(m.cache_hits, 1);
        assert_eq!(m.cache_misses, 1);
        assert_eq!(m.hit_rate, 0.5);
        assert_eq!(cache.trace().len(), 2);
    }

    #[test]
    fn unregistered_operation_is_fatal() {
        let cache = MemoCache::default();
        let err = cache.invoke("nope", &[]).unwrap_err();
        assert_eq!(err, CoreError::OperationNotRegistered("nope".into()));
    }

    #[test]
    fn raised_error_becomes_cached_failure() {
        let (cache, calls) = square_cache();
        let r = cache.invoke("square", &[json!("x")]).unwrap();
        assert!(!r.result.success);
        assert_eq!(r.result.function.as_deref(), Some("square"));
        assert!(r.result.error.as_deref().unwrap_or_default().contains("expected integer"));
        let again = cache.invoke("square", &[json!("x")]).unwrap();
        assert!(again.cached);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn disabled_cache_always_executes() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let config = CacheConfig { enabled: false,
                                   ..CacheConfig::default() };
        let mut cache = MemoCache::new(config, DeterministicSource::with_identifier("test"));
        cache.register_fn("one", move |_ctx, _args| {
                 counter.fetch_add(1, Ordering::SeqCst);
                 Ok(OpResult::ok(json!(1)))
             });
        cache.invoke("one", &[]).unwrap();
        cache.invoke("one", &[]).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(cache.is_empty());
    }

    #[test]
    fn eviction_removes_oldest_fifth() {
        let config = CacheConfig { max_cache_size: 10,
                                   ..CacheConfig::default() };
        let mut cache = MemoCache::new(config, DeterministicSource::with_identifier("test"));
        cache.register_fn("id", |_ctx, args| Ok(OpResult::ok(args[0].clone())));
        for n in 0..11 {
            cache.invoke("id", &[json!(n)]).unwrap();
        }
        // 11 > 10 => se eliminan max(1, ceil(2.2)) = 3
        assert_eq!(cache.len(), 8);
        assert!(!cache.contains(&MemoCache::input_hash("id", &[json!(0)])));
        assert!(!cache.contains(&MemoCache::input_hash("id", &[json!(2)])));
        assert!(cache.contains(&MemoCache::input_hash("id", &[json!(3)])));
    }

    #[test]
    fn hit_does_not_refresh_entry_age() {
        let config = CacheConfig { max_cache_size: 4,
                                   ..CacheConfig::default() };
        let mut cache = MemoCache::new(config, DeterministicSource::with_identifier("test"));
        cache.register_fn("id", |_ctx, args| Ok(OpResult::ok(args[0].clone())));
        for n in 0..4 {
            cache.invoke("id", &[json!(n)]).unwrap();
        }
        assert!(cache.invoke("id", &[json!(0)]).unwrap().cached);
        cache.invoke("id", &[json!(4)]).unwrap();
        assert!(!cache.contains(&MemoCache::input_hash("id", &[json!(0)])));
    }

    #[test]
    fn reregistration_replaces_binding() {
        let mut cache = MemoCache::default();
        assert!(cache.register_fn("op", |_c, _a| Ok(OpResult::ok(json!(1)))).is_none());
        assert!(cache.register_fn("op", |_c, _a| Ok(OpResult::ok(json!(2)))).is_some());
        assert_eq!(cache.invoke("op", &[]).unwrap().result.value, json!(2));
        assert_eq!(cache.registry().len(), 1);
    }

    #[test]
    fn rebinding_drops_entries_of_previous_binding() {
        let mut cache = MemoCache::default();
        cache.register_fn("op", |_c, _a| Ok(OpResult::ok(json!(1))));
        cache.register_fn("other", |_c, _a| Ok(OpResult::ok(json!("o"))));
        assert_eq!(cache.invoke("op", &[]).unwrap().result.value, json!(1));
        cache.invoke("other", &[]).unwrap();

        cache.register_fn("op", |_c, _a| Ok(OpResult::ok(json!(2))));
        let after = cache.invoke("op", &[]).unwrap();
        assert!(!after.cached);
        assert_eq!(after.result.value, json!(2));
        assert!(cache.invoke("other", &[]).unwrap().cached);
    }

    #[test]
    fn imported_old_records_are_evicted_before_fresh_entries() {
        let (source, _) = square_cache();
        source.invoke("square", &[json!(1)]).unwrap();
        source.invoke("square", &[json!(2)]).unwrap();
        let mut snapshot = source.export_state();
        let day_ago = Utc::now() - chrono::Duration::days(1);
        for record in &mut snapshot.records {
            record.timestamp = day_ago;
        }

        let config = CacheConfig { max_cache_size: 3,
                                   ..CacheConfig::default() };
        let mut cache = MemoCache::new(config, DeterministicSource::with_identifier("test"));
        cache.register_fn("square", |_c, args| {
                 let n = args[0].as_i64().unwrap_or_default();
                 Ok(OpResult::ok(json!(n * n)))
             });
        cache.invoke("square", &[json!(10)]).unwrap();
        assert_eq!(cache.import_state(&snapshot).unwrap(), 2);
        cache.invoke("square", &[json!(11)]).unwrap();

        // 4 > 3 => se elimina max(1, ceil(0.8)) = 1, el registro más viejo
        assert_eq!(cache.len(), 3);
        assert!(cache.contains(&MemoCache::input_hash("square", &[json!(10)])));
        assert!(cache.contains(&MemoCache::input_hash("square", &[json!(11)])));
        assert!(!cache.contains(&MemoCache::input_hash("square", &[json!(1)])));
        assert_eq!(cache.entries()[0].created_at, day_ago);
    }

    #[test]
    fn import_adds_snapshot_counters_to_current_ones() {
        let (source, _) = square_cache();
        source.invoke("square", &[json!(3)]).unwrap();
        source.invoke("square", &[json!(3)]).unwrap();
        let snapshot = source.export_state();

        let (target, _) = square_cache();
        target.invoke("square", &[json!(8)]).unwrap();
        target.import_state(&snapshot).unwrap();
        let m = target.metrics();
        assert_eq!(m.total_operations, 3);
        assert_eq!(m.cache_hits, 1);
        assert_eq!(m.cache_misses, 2);
    }

    #[test]
    fn export_import_roundtrip() {
        let (cache, _) = square_cache();
        cache.invoke("square", &[json!(3)]).unwrap();
        cache.invoke("square", &[json!(4)]).unwrap();
        let snapshot = cache.export_state();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.records[0].result.value, json!(9));

        let (restored, calls) = square_cache();
        assert_eq!(restored.import_state(&snapshot).unwrap(), 2);
        assert!(restored.invoke("square", &[json!(4)]).unwrap().cached);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn import_rejects_tampered_records() {
        let (cache, _) = square_cache();
        cache.invoke("square", &[json!(3)]).unwrap();
        let mut snapshot = cache.export_state();
        snapshot.records[0].result.value = json!(10);
        let (target, _) = square_cache();
        assert!(matches!(target.import_state(&snapshot), Err(CoreError::SnapshotRejected(_))));
        assert!(target.is_empty());

        let mut wrong_version = cache.export_state();
        wrong_version.engine_version = "G0".into();
        assert!(matches!(target.import_state(&wrong_version), Err(CoreError::SnapshotRejected(_))));
    }

    #[test]
    fn import_rejects_other_epoch() {
        let (cache, _) = square_cache();
        cache.invoke("square", &[json!(3)]).unwrap();
        let snapshot = cache.export_state();
        let mut other = MemoCache::new(CacheConfig::default(), DeterministicSource::with_identifier("other"));
        other.register_fn("square", |_c, _a| Ok(OpResult::ok(json!(0))));
        assert!(matches!(other.import_state(&snapshot), Err(CoreError::SnapshotRejected(_))));
    }

    #[test]
    fn reset_clears_everything() {
        let (mut cache, _) = square_cache();
        cache.invoke("square", &[json!(2)]).unwrap();
        cache.record_idempotency_violation();
        cache.reset();
        assert!(cache.is_empty());
        assert!(cache.trace().is_empty());
        assert_eq!(cache.metrics(), MetricsSnapshot::default());
    }

    #[test]
    fn isolated_cache_shares_registry_only() {
        let (cache, _) = square_cache();
        cache.invoke("square", &[json!(5)]).unwrap();
        let iso = cache.isolated();
        let r = iso.invoke("square", &[json!(5)]).unwrap();
        assert!(!r.cached);
        assert!(iso.is_empty());
        assert!(iso.trace().is_empty());
        assert_eq!(cache.metrics().total_operations, 1);
    }
}
