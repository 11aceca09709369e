use std::sync::{Mutex, PoisonError};

use gen_core::CacheSnapshot;

use crate::error::PersistenceError;

/// Destino de snapshots de la cache. `load` devuelve `None` si nunca se
/// guardó nada.
pub trait SnapshotStore: Send + Sync {
    fn save(&self, snapshot: &CacheSnapshot) -> Result<(), PersistenceError>;
    fn load(&self) -> Result<Option<CacheSnapshot>, PersistenceError>;
    /// Como `load`, pero la ausencia de snapshot es un error.
    fn load_required(&self) -> Result<CacheSnapshot, PersistenceError> {
        self.load()?
            .ok_or_else(|| PersistenceError::NotFound(self.location()))
    }
    /// Descripción legible de dónde vive el snapshot.
    fn location(&self) -> String;
    /// Elimina el snapshot guardado. `Ok(false)` si no había ninguno.
    fn clear(&self) -> Result<bool, PersistenceError>;
}

/// Store en memoria (tests y ejecuciones efímeras).
#[derive(Debug, Default)]
pub struct InMemorySnapshotStore {
    slot: Mutex<Option<CacheSnapshot>>,
}

impl InMemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SnapshotStore for InMemorySnapshotStore {
    fn save(&self, snapshot: &CacheSnapshot) -> Result<(), PersistenceError> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(snapshot.clone());
        Ok(())
    }

    fn load(&self) -> Result<Option<CacheSnapshot>, PersistenceError> {
        Ok(self.slot.lock().unwrap_or_else(PoisonError::into_inner).clone())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }

    fn clear(&self) -> Result<bool, PersistenceError> {
        Ok(self.slot.lock().unwrap_or_else(PoisonError::into_inner).take().is_some())
    }
}
