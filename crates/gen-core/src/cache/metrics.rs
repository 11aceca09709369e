use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Contadores de la cache (lectura concurrente, escritura atómica).
#[derive(Debug, Default)]
pub struct CacheMetrics {
    total_operations: AtomicU64,
    cache_hits: AtomicU64,
    cache_misses: AtomicU64,
    idempotency_violations: AtomicU64,
    total_execution_us: AtomicU64,
}

/// Vista inmutable de los contadores.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub total_operations: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub hit_rate: f64,
    pub idempotency_violations: u64,
    pub total_execution_ms: f64,
    /// Promedio sobre ejecuciones reales (misses).
    pub average_execution_ms: f64,
}

impl CacheMetrics {
    pub fn record_hit(&self) {
        self.total_operations.fetch_add(1, Ordering::Relaxed);
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_miss(&self, duration_ms: f64) {
        self.total_operations.fetch_add(1, Ordering::Relaxed);
        self.cache_misses.fetch_add(1, Ordering::Relaxed);
        self.total_execution_us.fetch_add((duration_ms * 1000.0).round() as u64, Ordering::Relaxed);
    }

    pub fn record_idempotency_violation(&self) {
        self.idempotency_violations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let total = self.total_operations.load(Ordering::Relaxed);
        let hits = self.cache_hits.load(Ordering::Relaxed);
        let misses = self.cache_misses.load(Ordering::Relaxed);
        let total_ms = self.total_execution_us.load(Ordering::Relaxed) as f64 / 1000.0;
        MetricsSnapshot { total_operations: total,
                          cache_hits: hits,
                          cache_misses: misses,
                          hit_rate: if total == 0 { 0.0 } else { hits as f64 / total as f64 },
                          idempotency_violations: self.idempotency_violations.load(Ordering::Relaxed),
                          total_execution_ms: total_ms,
                          average_execution_ms: if misses == 0 { 0.0 } else { total_ms / misses as f64 } }
    }

    /// Reemplaza los contadores por los de `snapshot` (import de estado).
    pub fn restore(&self, snapshot: &MetricsSnapshot) {
        self.total_operations.store(snapshot.total_operations, Ordering::Relaxed);
        self.cache_hits.store(snapshot.cache_hits, Ordering::Relaxed);
        self.cache_misses.store(snapshot.cache_misses, Ordering::Relaxed);
        self.idempotency_violations.store(snapshot.idempotency_violations, Ordering::Relaxed);
        self.total_execution_us.store((snapshot.total_execution_ms * 1000.0).round() as u64, Ordering::Relaxed);
    }

    /// Suma los contadores de `snapshot` a los actuales (import de estado).
    pub fn merge(&self, snapshot: &MetricsSnapshot) {
        self.total_operations.fetch_add(snapshot.total_operations, Ordering::Relaxed);
        self.cache_hits.fetch_add(snapshot.cache_hits, Ordering::Relaxed);
        self.cache_misses.fetch_add(snapshot.cache_misses, Ordering::Relaxed);
        self.idempotency_violations.fetch_add(snapshot.idempotency_violations, Ordering::Relaxed);
        self.total_execution_us
            .fetch_add((snapshot.total_execution_ms * 1000.0).round() as u64, Ordering::Relaxed);
    }

    pub fn reset(&self) {
        self.restore(&MetricsSnapshot::default());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hit_rate_and_average() {
        let m = CacheMetrics::default();
        m.record_miss(2.0);
        m.record_miss(4.0);
        m.record_hit();
        m.record_hit();
        let s = m.snapshot();
        assert_eq!(s.total_operations, 4);
        assert_eq!(s.hit_rate, 0.5);
        assert!((s.average_execution_ms - 3.0).abs() < 1e-9);
    }

    #[test]
    fn empty_metrics_have_zero_rates() {
        let s = CacheMetrics::default().snapshot();
        assert_eq!(s.hit_rate, 0.0);
        assert_eq!(s.average_execution_ms, 0.0);
    }

    #[test]
    fn restore_roundtrip_and_reset() {
        let m = CacheMetrics::default();
        m.record_miss(1.5);
        m.record_idempotency_violation();
        let snap = m.snapshot();
        let other = CacheMetrics::default();
        other.restore(&snap);
        assert_eq!(other.snapshot(), snap);
        other.merge(&snap);
        assert_eq!(other.snapshot().cache_misses, 2);
        assert_eq!(other.snapshot().idempotency_violations, 2);
        other.reset();
        assert_eq!(other.snapshot(), MetricsSnapshot::default());
    }
}
