//! Catálogo de pipelines con nombre.
//!
//! Catálogo por defecto:
//! - `ingest`: parse_triples → extract_entities
//! - `digest`: parse_triples → hash_content
//! - `generate`: se arma por invocación con template y nombre de artefacto
//!   (ver `PipelineCatalog::generation`).

use gen_adapters::DomainOperation;
use gen_core::{CoreError, Pipeline, PipelineStep};
use indexmap::IndexMap;
use serde_json::Value;
use tracing::warn;

pub const INGEST_PIPELINE: &str = "ingest";
pub const DIGEST_PIPELINE: &str = "digest";
pub const GENERATE_PIPELINE: &str = "generate";

#[derive(Debug, Clone, Default)]
pub struct PipelineCatalog {
    pipelines: IndexMap<String, Pipeline>,
}

impl PipelineCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_defaults() -> Result<Self, CoreError> {
        let mut catalog = Self::new();
        catalog.define(INGEST_PIPELINE,
                       vec![PipelineStep::op(DomainOperation::ParseTriples),
                            PipelineStep::op(DomainOperation::ExtractEntities)])?;
        catalog.define(DIGEST_PIPELINE,
                       vec![PipelineStep::op(DomainOperation::ParseTriples),
                            PipelineStep::op(DomainOperation::HashContent)])?;
        Ok(catalog)
    }

    /// Pipeline de generación: ingest + render(template) + generate(name).
    pub fn generation(template: &str, artifact_name: &str) -> Result<Pipeline, CoreError> {
        Pipeline::build(vec![PipelineStep::op(DomainOperation::ParseTriples),
                             PipelineStep::op(DomainOperation::ExtractEntities),
                             PipelineStep::new(DomainOperation::RenderTemplate, vec![Value::from(template)]),
                             PipelineStep::new(DomainOperation::GenerateArtifact, vec![Value::from(artifact_name)])])
    }

    /// Define (o redefine) un pipeline. Redefinir reemplaza la versión previa.
    pub fn define(&mut self, name: &str, steps: Vec<PipelineStep>) -> Result<&Pipeline, CoreError> {
        let pipeline = Pipeline::build(steps)?;
        if self.pipelines.contains_key(name) {
            warn!(pipeline = name, "pipeline redefined");
        }
        let (index, _) = self.pipelines.insert_full(name.to_string(), pipeline);
        self.pipelines
            .get_index(index)
            .map(|(_, p)| p)
            .ok_or_else(|| CoreError::Internal(format!("pipeline {name} missing after insert")))
    }

    pub fn get(&self, name: &str) -> Option<&Pipeline> {
        self.pipelines.get(name)
    }

    /// Nombres en orden de definición.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.pipelines.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.pipelines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pipelines.is_empty()
    }
}
