use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::model::{Operation, OperationId};

/// Registro de operaciones. Se comparte (clonado barato) entre la cache
/// principal y los contextos aislados de verificación; registrar sobre un
/// clon no afecta a los demás.
#[derive(Clone, Default)]
pub struct OperationRegistry {
    ops: Arc<IndexMap<OperationId, Arc<dyn Operation>>>,
}

impl OperationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registra `op` bajo `id`. Devuelve la operación reemplazada si la había.
    pub fn register(&mut self, id: OperationId, op: Arc<dyn Operation>) -> Option<Arc<dyn Operation>> {
        Arc::make_mut(&mut self.ops).insert(id, op)
    }

    pub fn get(&self, id: &str) -> Option<&Arc<dyn Operation>> {
        self.ops.get(id)
    }

    /// Busca la operación junto con su id registrado.
    pub fn get_full(&self, id: &str) -> Option<(&OperationId, &Arc<dyn Operation>)> {
        self.ops.get_key_value(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ops.contains_key(id)
    }

    /// Ids en orden de registro.
    pub fn ids(&self) -> impl Iterator<Item = &OperationId> {
        self.ops.keys()
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

impl fmt::Debug for OperationRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.ops.keys()).finish()
    }
}
