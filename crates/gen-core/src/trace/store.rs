use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::Utc;

use super::ExecutionTraceEntry;
use crate::model::Invocation;

/// Almacenamiento de trazas append-only.
pub trait TraceStore: Send + Sync {
    /// Agrega una entrada a partir de una invocación y devuelve la entrada
    /// completa (con seq y timestamp).
    fn append(&self, invocation: &Invocation) -> ExecutionTraceEntry;
    /// Lista todas las entradas retenidas (orden ascendente por seq).
    fn list(&self) -> Vec<ExecutionTraceEntry>;
    /// Últimas `limit` entradas (orden ascendente por seq).
    fn recent(&self, limit: usize) -> Vec<ExecutionTraceEntry>;
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
    fn clear(&self);
}

/// Ring buffer acotado: con `capacity` entradas llenas, agregar una nueva
/// descarta la más antigua. `seq` sigue creciendo tras descartes y tras
/// `clear`.
#[derive(Debug)]
pub struct InMemoryTraceStore {
    capacity: usize,
    inner: Mutex<VecDeque<ExecutionTraceEntry>>,
    next_seq: AtomicU64,
}

impl InMemoryTraceStore {
    pub fn with_capacity(capacity: usize) -> Self {
        Self { capacity,
               inner: Mutex::new(VecDeque::with_capacity(capacity.min(1024))),
               next_seq: AtomicU64::new(0) }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn guard(&self) -> MutexGuard<'_, VecDeque<ExecutionTraceEntry>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for InMemoryTraceStore {
    fn default() -> Self {
        Self::with_capacity(crate::constants::DEFAULT_TRACE_CAPACITY)
    }
}

impl TraceStore for InMemoryTraceStore {
    fn append(&self, invocation: &Invocation) -> ExecutionTraceEntry {
        let entry = ExecutionTraceEntry { seq: self.next_seq.fetch_add(1, Ordering::SeqCst),
                                          operation: invocation.operation.clone(),
                                          input_hash: invocation.input_hash.clone(),
                                          output_hash: invocation.output_hash.clone(),
                                          cached: invocation.cached,
                                          timestamp: Utc::now(),
                                          duration_ms: invocation.duration_ms };
        if self.capacity == 0 {
            return entry;
        }
        let mut buf = self.guard();
        while buf.len() >= self.capacity {
            buf.pop_front();
        }
        buf.push_back(entry.clone());
        entry
    }

    fn list(&self) -> Vec<ExecutionTraceEntry> {
        self.guard().iter().cloned().collect()
    }

    fn recent(&self, limit: usize) -> Vec<ExecutionTraceEntry> {
        let buf = self.guard();
        let skip = buf.len().saturating_sub(limit);
        buf.iter().skip(skip).cloned().collect()
    }

    fn len(&self) -> usize {
        self.guard().len()
    }

    fn clear(&self) {
        self.guard().clear();
    }
}
