use std::time::Instant;

use rayon::prelude::*;
use serde_json::Value;
use tracing::{debug, warn};

use super::{IdempotencyVerdict, RunRecord};
use crate::cache::MemoCache;
use crate::errors::CoreError;
use crate::model::OperationId;
use crate::pipeline::Pipeline;

/// Qué se verifica: una operación (entrada + argumentos extra) o un pipeline.
#[derive(Debug, Clone)]
pub enum VerificationTarget {
    Operation { id: OperationId, extra_args: Vec<Value> },
    Pipeline(Pipeline),
}

impl VerificationTarget {
    pub fn operation(id: impl Into<OperationId>) -> Self {
        Self::Operation { id: id.into(),
                          extra_args: Vec::new() }
    }

    pub fn label(&self) -> String {
        match self {
            Self::Operation { id, .. } => id.to_string(),
            Self::Pipeline(p) => format!("pipeline:{}", p.definition_hash().short()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerifierConfig {
    /// Ejecutar repeticiones en paralelo (rayon).
    pub parallel: bool,
    /// Conservar el detalle de cada repetición en el veredicto.
    pub keep_runs: bool,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self { parallel: true,
               keep_runs: false }
    }
}

/// Verificador de idempotencia sobre el registro de una cache.
#[derive(Debug)]
pub struct IdempotencyVerifier<'a> {
    cache: &'a MemoCache,
    config: VerifierConfig,
}

impl<'a> IdempotencyVerifier<'a> {
    pub fn new(cache: &'a MemoCache, config: VerifierConfig) -> Self {
        Self { cache, config }
    }

    pub fn verify(&self, target: &VerificationTarget, input: &Value, iterations: usize) -> Result<IdempotencyVerdict, CoreError> {
        if iterations == 0 {
            return Err(CoreError::InvalidArgument("iterations must be at least 1".into()));
        }
        let runs: Vec<RunRecord> = if self.config.parallel {
            (0..iterations).into_par_iter()
                           .map(|i| self.run_once(i, target, input))
                           .collect::<Result<_, _>>()?
        } else {
            (0..iterations).map(|i| self.run_once(i, target, input))
                           .collect::<Result<_, _>>()?
        };
        let verdict = IdempotencyVerdict::from_runs(runs, self.config.keep_runs);
        if verdict.is_idempotent {
            debug!(subject = %target.label(), iterations, "idempotent");
        } else {
            warn!(subject = %target.label(), iterations, diagnosis = ?verdict.diagnosis, "idempotency violation");
        }
        Ok(verdict)
    }

    fn run_once(&self, iteration: usize, target: &VerificationTarget, input: &Value) -> Result<RunRecord, CoreError> {
        let isolated = self.cache.isolated();
        let clock = Instant::now();
        let (success, outcome_hash, error) = match target {
            VerificationTarget::Operation { id, extra_args } => {
                let mut args = Vec::with_capacity(extra_args.len() + 1);
                args.push(input.clone());
                args.extend(extra_args.iter().cloned());
                let invocation = isolated.invoke(id.as_str(), &args)?;
                (invocation.result.success, invocation.output_hash, invocation.result.error)
            }
            VerificationTarget::Pipeline(pipeline) => {
                let run = pipeline.run(&isolated, input.clone())?;
                (run.success, run.outcome_hash(), run.error)
            }
        };
        Ok(RunRecord { iteration,
                       success,
                       outcome_hash,
                       duration_ms: clock.elapsed().as_secs_f64() * 1000.0,
                       error })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheConfig;
    use crate::determinism::DeterministicSource;
    use crate::model::OpResult;
    use crate::pipeline::PipelineStep;
    use crate::IdempotencyDiagnosis;
    use serde_json::json;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;

    fn cache() -> MemoCache {
        let mut cache = MemoCache::new(CacheConfig::default(), DeterministicSource::with_identifier("verify"));
        cache.register_fn("pure", |_c, args| Ok(OpResult::ok(json!({"echo": args[0]}))));
        cache.register_fn("seeded", |ctx, _args| Ok(OpResult::ok(json!(ctx.values().hex(16, "seeded")))));
        let counter = Arc::new(AtomicU64::new(0));
        cache.register_fn("impure", move |_c, _a| Ok(OpResult::ok(json!(counter.fetch_add(1, Ordering::SeqCst)))));
        cache
    }

    #[test]
    fn pure_operation_converges_without_touching_cache() {
        let cache = cache();
        let verifier = IdempotencyVerifier::new(&cache, VerifierConfig::default());
        let v = verifier.verify(&VerificationTarget::operation("pure"), &json!(1), 5).unwrap();
        assert!(v.is_idempotent);
        assert_eq!(v.iterations, 5);
        assert!(cache.is_empty());
        assert_eq!(cache.metrics().total_operations, 0);
    }

    #[test]
    fn seeded_values_repeat_across_contexts() {
        let cache = cache();
        let verifier = IdempotencyVerifier::new(&cache, VerifierConfig::default());
        let v = verifier.verify(&VerificationTarget::operation("seeded"), &Value::Null, 4).unwrap();
        assert!(v.is_idempotent);
    }

    #[test]
    fn impure_operation_is_detected() {
        let cache = cache();
        let verifier = IdempotencyVerifier::new(&cache,
                                                VerifierConfig { parallel: false,
                                                                 keep_runs: true });
        let v = verifier.verify(&VerificationTarget::operation("impure"), &Value::Null, 3).unwrap();
        assert!(!v.is_idempotent);
        assert_eq!(v.diagnosis, IdempotencyDiagnosis::NonDeterministic { distinct_hashes: 3 });
        assert_eq!(v.runs.map(|r| r.len()), Some(3));
    }

    #[test]
    fn zero_iterations_is_invalid() {
        let cache = cache();
        let verifier = IdempotencyVerifier::new(&cache, VerifierConfig::default());
        assert!(matches!(verifier.verify(&VerificationTarget::operation("pure"), &json!(1), 0),
                         Err(CoreError::InvalidArgument(_))));
    }

    #[test]
    fn pipeline_target() {
        let cache = cache();
        let pipeline = Pipeline::build(vec![PipelineStep::op("pure"), PipelineStep::op("pure")]).unwrap();
        let verifier = IdempotencyVerifier::new(&cache, VerifierConfig::default());
        let v = verifier.verify(&VerificationTarget::Pipeline(pipeline), &json!("x"), 3).unwrap();
        assert!(v.is_idempotent);
        assert_eq!(v.unique_output_hash_count, 1);
    }
}
