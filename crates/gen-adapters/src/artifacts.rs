//! Payloads tipados de las operaciones de dominio.
//!
//! Sólo definen la forma JSON del `value` de cada `OpResult`; el hash lo
//! calcula la cache sobre la forma canónica.

use std::collections::BTreeMap;

use gen_core::{typed_payload, TypedPayload};

// Triple opaco: los términos se guardan tal como aparecen en la fuente
// (`<iri>`, `prefix:name`, `_:b0`, `"literal"@es`).
typed_payload!(Triple { subject: String,
                        predicate: String,
                        object: String } kind: "triple");

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ParsedGraph {
    pub triples: Vec<Triple>,
    pub count: usize,
}

impl TypedPayload for ParsedGraph {
    const KIND: &'static str = "parsed_graph";

    fn validate(&self) -> Result<(), String> {
        if self.count != self.triples.len() {
            return Err(format!("count {} does not match {} triples", self.count, self.triples.len()));
        }
        Ok(())
    }
}

// Entidad: sujeto + objetos agrupados por predicado (orden de aparición).
typed_payload!(Entity { id: String,
                        properties: BTreeMap<String, Vec<String>> } kind: "entity");

typed_payload!(EntitySet { entities: Vec<Entity>,
                           count: usize } kind: "entity_set");

typed_payload!(RenderedTemplate { content: String,
                                  content_hash: String } kind: "rendered_template");

typed_payload!(GeneratedArtifact { name: String,
                                   content: String,
                                   content_hash: String,
                                   generated_at: String,
                                   artifact_id: String } kind: "generated_artifact");

typed_payload!(HashedContent { hash: String });

typed_payload!(FileContent { path: String,
                             content: String,
                             size: u64,
                             content_hash: String } kind: "file_content");
