//! Orquestador principal.
//! Se encarga de:
//! - Construir la fuente determinista y la cache con las operaciones de
//!   dominio registradas.
//! - Mantener el catálogo de pipelines con nombre.
//! - Ejecutar pipelines registrando un resumen acotado por ejecución.
//! - Verificar idempotencia (contextos aislados) y contar violaciones.
//! - Guardar y restaurar el estado de la cache vía `SnapshotStore`.
use std::sync::Arc;

use gen_adapters::register_all;
use gen_core::{DeterministicSource, IdempotencyVerdict, IdempotencyVerifier, Invocation, MemoCache, MetricsSnapshot, OpContext,
               OpResult, Operation, OperationError, OperationId, Pipeline, PipelineRunResult, PipelineStep, VerificationTarget,
               VerifierConfig};
use gen_persistence::SnapshotStore;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use super::catalog::{PipelineCatalog, GENERATE_PIPELINE};
use super::run_log::{RunLog, RunRecord};
use crate::config::AppConfig;
use crate::errors::OrchestratorError;

/// Nombre con el que se registran ejecuciones de pasos sueltos.
pub const ADHOC_PIPELINE: &str = "<adhoc>";

/// Métricas agregadas: cache + ejecuciones de pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrchestratorMetrics {
    pub cache: MetricsSnapshot,
    pub cache_entries: usize,
    pub pipeline_runs: usize,
    pub successful_runs: usize,
    pub failed_runs: usize,
    pub average_run_ms: f64,
}

pub struct Orchestrator {
    cache: MemoCache,
    catalog: PipelineCatalog,
    runs: RunLog,
    verifier: VerifierConfig,
}

impl Orchestrator {
    pub fn new(config: &AppConfig) -> Result<Self, OrchestratorError> {
        let values = DeterministicSource::new(config.seed.clone());
        let mut cache = MemoCache::new(config.cache.clone(), values);
        register_all(&mut cache);
        Ok(Self { cache,
                  catalog: PipelineCatalog::with_defaults()?,
                  runs: RunLog::with_capacity(config.run_log_capacity),
                  verifier: config.verifier })
    }

    pub fn cache(&self) -> &MemoCache {
        &self.cache
    }

    pub fn values(&self) -> &DeterministicSource {
        self.cache.values()
    }

    pub fn catalog(&self) -> &PipelineCatalog {
        &self.catalog
    }

    /// Abre una época determinista nueva con `identifier` (o redescubre).
    pub fn reseed(&mut self, identifier: Option<&str>) {
        let mut values = self.cache.values().fresh();
        values.initialize(identifier);
        self.cache.set_values(values);
    }

    pub fn register<O>(&mut self, id: impl Into<OperationId>, op: O) -> Option<Arc<dyn Operation>>
        where O: Operation + 'static
    {
        self.cache.register(id, op)
    }

    pub fn register_fn<F>(&mut self, id: impl Into<OperationId>, f: F) -> Option<Arc<dyn Operation>>
        where F: Fn(&OpContext, &[Value]) -> Result<OpResult, OperationError> + Send + Sync + 'static
    {
        self.cache.register_fn(id, f)
    }

    pub fn invoke(&self, id: &str, args: &[Value]) -> Result<Invocation, OrchestratorError> {
        Ok(self.cache.invoke(id, args)?)
    }

    pub fn define_pipeline(&mut self, name: &str, steps: Vec<PipelineStep>) -> Result<&Pipeline, OrchestratorError> {
        Ok(self.catalog.define(name, steps)?)
    }

    fn pipeline(&self, name: &str) -> Result<&Pipeline, OrchestratorError> {
        self.catalog
            .get(name)
            .ok_or_else(|| OrchestratorError::UnknownPipeline(name.to_string()))
    }

    pub fn run_pipeline(&self, name: &str, input: Value) -> Result<PipelineRunResult, OrchestratorError> {
        let pipeline = self.pipeline(name)?;
        self.execute(name, pipeline, input)
    }

    /// Ejecuta una lista de pasos sin registrarla en el catálogo.
    pub fn run_steps(&self, steps: Vec<PipelineStep>, input: Value) -> Result<PipelineRunResult, OrchestratorError> {
        let pipeline = Pipeline::build(steps)?;
        self.execute(ADHOC_PIPELINE, &pipeline, input)
    }

    /// Pipeline de generación completo sobre un grafo en texto.
    pub fn generate(&self, graph: &str, template: &str, artifact_name: &str) -> Result<PipelineRunResult, OrchestratorError> {
        let pipeline = PipelineCatalog::generation(template, artifact_name)?;
        self.execute(GENERATE_PIPELINE, &pipeline, Value::from(graph))
    }

    fn execute(&self, name: &str, pipeline: &Pipeline, input: Value) -> Result<PipelineRunResult, OrchestratorError> {
        let run = pipeline.run(&self.cache, input)?;
        if run.success {
            info!(pipeline = name, id = run.pipeline_id.short(), steps = run.steps.len(), hits = run.cache_hits(), "run ok");
        } else {
            warn!(pipeline = name, id = run.pipeline_id.short(), error = run.error.as_deref().unwrap_or_default(), "run failed");
        }
        self.runs.push(RunRecord::from_run(name, &run));
        Ok(run)
    }

    pub fn verify_operation(&self, id: &str, input: &Value, iterations: usize) -> Result<IdempotencyVerdict, OrchestratorError> {
        if !self.cache.registry().contains(id) {
            return Err(gen_core::CoreError::OperationNotRegistered(id.to_string()).into());
        }
        let target = VerificationTarget::Operation { id: OperationId::new(id),
                                                     extra_args: Vec::new() };
        self.verify(&target, input, iterations)
    }

    pub fn verify_pipeline(&self, name: &str, input: &Value, iterations: usize) -> Result<IdempotencyVerdict, OrchestratorError> {
        let target = VerificationTarget::Pipeline(self.pipeline(name)?.clone());
        self.verify(&target, input, iterations)
    }

    /// Verifica un pipeline arbitrario (p.ej. el de generación).
    pub fn verify_steps(&self, pipeline: Pipeline, input: &Value, iterations: usize) -> Result<IdempotencyVerdict, OrchestratorError> {
        self.verify(&VerificationTarget::Pipeline(pipeline), input, iterations)
    }

    fn verify(&self, target: &VerificationTarget, input: &Value, iterations: usize) -> Result<IdempotencyVerdict, OrchestratorError> {
        let verdict = IdempotencyVerifier::new(&self.cache, self.verifier).verify(target, input, iterations)?;
        if !verdict.is_idempotent {
            self.cache.record_idempotency_violation();
        }
        Ok(verdict)
    }

    pub fn runs(&self) -> Vec<RunRecord> {
        self.runs.list()
    }

    pub fn metrics(&self) -> OrchestratorMetrics {
        let runs = self.runs.list();
        let successful_runs = runs.iter().filter(|r| r.success).count();
        let total_ms: f64 = runs.iter().map(|r| r.duration_ms).sum();
        OrchestratorMetrics { cache: self.cache.metrics(),
                              cache_entries: self.cache.len(),
                              pipeline_runs: runs.len(),
                              successful_runs,
                              failed_runs: runs.len() - successful_runs,
                              average_run_ms: if runs.is_empty() { 0.0 } else { total_ms / runs.len() as f64 } }
    }

    /// Guarda el estado de la cache. Devuelve cuántas entradas se guardaron.
    pub fn save_cache(&self, store: &dyn SnapshotStore) -> Result<usize, OrchestratorError> {
        let snapshot = self.cache.export_state();
        store.save(&snapshot)?;
        Ok(snapshot.len())
    }

    /// Restaura la cache desde el store. Sin snapshot guardado no hace nada.
    pub fn load_cache(&self, store: &dyn SnapshotStore) -> Result<usize, OrchestratorError> {
        match store.load()? {
            Some(snapshot) => Ok(self.cache.import_state(&snapshot)?),
            None => Ok(0),
        }
    }

    /// Limpia cache, traza, contadores y registros de ejecución.
    pub fn reset(&mut self) {
        self.cache.reset();
        self.runs.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::catalog::INGEST_PIPELINE;
    use gen_core::{CacheConfig, IdempotencyDiagnosis, SeedConfig};
    use gen_persistence::InMemorySnapshotStore;
    use serde_json::json;
    use std::sync::atomic::{AtomicU64, Ordering};

    fn config() -> AppConfig {
        AppConfig { seed: SeedConfig::fixed("orchestrator"),
                    cache: CacheConfig::default(),
                    ..AppConfig::default() }
    }

    const GRAPH: &str = "ex:a ex:p ex:b .\nex:b ex:p ex:c .\n";

    #[test]
    fn runs_named_pipeline_and_records_it() {
        let o = Orchestrator::new(&config()).unwrap();
        let run = o.run_pipeline(INGEST_PIPELINE, json!(GRAPH)).unwrap();
        assert!(run.success);
        assert_eq!(run.final_value()["count"], json!(2));
        let again = o.run_pipeline(INGEST_PIPELINE, json!(GRAPH)).unwrap();
        assert_eq!(again.cache_hits(), 2);
        let runs = o.runs();
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[1].cache_hits, 2);
        assert_eq!(o.metrics().successful_runs, 2);
    }

    #[test]
    fn unknown_pipeline() {
        let o = Orchestrator::new(&config()).unwrap();
        assert!(matches!(o.run_pipeline("nope", json!(null)), Err(OrchestratorError::UnknownPipeline(_))));
    }

    #[test]
    fn verification_counts_violations() {
        let mut o = Orchestrator::new(&config()).unwrap();
        let counter = AtomicU64::new(0);
        o.register_fn("tick", move |_c, _a| Ok(OpResult::ok(json!(counter.fetch_add(1, Ordering::SeqCst)))));
        let v = o.verify_operation("tick", &json!(null), 3).unwrap();
        assert!(matches!(v.diagnosis, IdempotencyDiagnosis::NonDeterministic { .. }));
        assert_eq!(o.metrics().cache.idempotency_violations, 1);

        let ok = o.verify_pipeline(INGEST_PIPELINE, &json!(GRAPH), 3).unwrap();
        assert!(ok.is_idempotent);
        assert_eq!(o.metrics().cache.idempotency_violations, 1);
    }

    #[test]
    fn save_load_and_reset() {
        let mut o = Orchestrator::new(&config()).unwrap();
        o.run_pipeline(INGEST_PIPELINE, json!(GRAPH)).unwrap();
        let store = InMemorySnapshotStore::new();
        assert_eq!(o.save_cache(&store).unwrap(), 2);
        o.reset();
        assert_eq!(o.metrics().cache_entries, 0);
        assert!(o.runs().is_empty());
        assert_eq!(o.load_cache(&store).unwrap(), 2);
        assert_eq!(o.run_pipeline(INGEST_PIPELINE, json!(GRAPH)).unwrap().cache_hits(), 2);
    }

    #[test]
    fn reseed_changes_generated_identity() {
        let mut o = Orchestrator::new(&config()).unwrap();
        let a = o.generate(GRAPH, "{{ count }}", "n.txt").unwrap();
        o.reset();
        o.reseed(Some("another"));
        let b = o.generate(GRAPH, "{{ count }}", "n.txt").unwrap();
        assert_eq!(a.final_value()["content"], b.final_value()["content"]);
        assert_ne!(a.final_value()["artifact_id"], b.final_value()["artifact_id"]);
    }
}
