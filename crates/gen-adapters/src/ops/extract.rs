use std::collections::BTreeMap;

use gen_core::{arg, OpContext, OpResult, Operation, OperationError, TypedPayload};
use serde_json::Value;

use crate::artifacts::{Entity, EntitySet, ParsedGraph};

/// Agrupa triples por sujeto. Entidades ordenadas por id; los objetos de
/// cada predicado conservan el orden de aparición.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtractEntities;

impl Operation for ExtractEntities {
    fn call(&self, _ctx: &OpContext, args: &[Value]) -> Result<OpResult, OperationError> {
        let graph = ParsedGraph::decode(arg(args, 0, "parsed")?)?;
        let mut by_subject: BTreeMap<String, BTreeMap<String, Vec<String>>> = BTreeMap::new();
        for t in graph.triples {
            by_subject.entry(t.subject)
                      .or_default()
                      .entry(t.predicate)
                      .or_default()
                      .push(t.object);
        }
        let entities: Vec<Entity> = by_subject.into_iter()
                                              .map(|(id, properties)| Entity { id, properties })
                                              .collect();
        EntitySet { count: entities.len(),
                    entities }.into_result()
    }
}
