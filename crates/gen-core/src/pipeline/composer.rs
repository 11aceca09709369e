use std::time::Instant;

use chrono::Utc;
use serde_json::{Map, Value};
use tracing::{debug, info};

use super::{FailedStep, Invoker, PipelineRunResult, PipelineStep, StepRecord};
use crate::errors::CoreError;
use crate::hashing::{hash_value, ContentHash};

/// Pipeline inmutable: lista ordenada de pasos + hash de la definición.
#[derive(Debug, Clone, PartialEq)]
pub struct Pipeline {
    steps: Vec<PipelineStep>,
    definition_hash: ContentHash,
}

impl Pipeline {
    pub fn build(steps: Vec<PipelineStep>) -> Result<Self, CoreError> {
        if steps.is_empty() {
            return Err(CoreError::EmptyPipeline);
        }
        let definition_hash = hash_value(&Self::steps_value(&steps));
        Ok(Self { steps, definition_hash })
    }

    fn steps_value(steps: &[PipelineStep]) -> Value {
        Value::Array(steps.iter().map(PipelineStep::to_value).collect())
    }

    pub fn steps(&self) -> &[PipelineStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Hash estable de la definición (pasos + argumentos estáticos).
    pub fn definition_hash(&self) -> &ContentHash {
        &self.definition_hash
    }

    pub fn run<I>(&self, invoker: &I, initial_input: Value) -> Result<PipelineRunResult, CoreError>
        where I: Invoker + ?Sized
    {
        let started_at = Utc::now();
        let clock = Instant::now();
        let pipeline_id = {
            let mut id = Map::new();
            id.insert("steps".into(), Self::steps_value(&self.steps));
            id.insert("initial_input".into(), initial_input.clone());
            id.insert("started_at".into(), Value::String(started_at.to_rfc3339()));
            hash_value(&Value::Object(id))
        };

        let mut records = Vec::with_capacity(self.steps.len());
        let mut current = initial_input;
        for (index, step) in self.steps.iter().enumerate() {
            let args = step.args_with(current);
            let invocation = invoker.invoke(step.operation.as_str(), &args)?;
            debug!(pipeline = pipeline_id.short(), index, operation = %step.operation, cached = invocation.cached, "step done");
            let result = invocation.result;
            records.push(StepRecord { index,
                                      operation: invocation.operation,
                                      input_hash: invocation.input_hash,
                                      output_hash: invocation.output_hash,
                                      cached: invocation.cached,
                                      duration_ms: invocation.duration_ms,
                                      result: result.clone() });
            if !result.success {
                let error = result.error.clone().unwrap_or_else(|| "step reported failure".to_string());
                info!(pipeline = pipeline_id.short(), index, operation = %step.operation, %error, "pipeline aborted");
                return Ok(PipelineRunResult { success: false,
                                              final_result: None,
                                              error: Some(error.clone()),
                                              failed_step: Some(FailedStep { index,
                                                                             operation: step.operation.clone(),
                                                                             error }),
                                              pipeline_id,
                                              steps: records,
                                              started_at,
                                              total_duration_ms: clock.elapsed().as_secs_f64() * 1000.0 });
            }
            current = result.value;
        }

        let final_result = records.last().map(|r| r.result.clone());
        let total_duration_ms = clock.elapsed().as_secs_f64() * 1000.0;
        info!(pipeline = pipeline_id.short(), steps = records.len(), total_duration_ms, "pipeline completed");
        Ok(PipelineRunResult { success: true,
                               final_result,
                               error: None,
                               failed_step: None,
                               pipeline_id,
                               steps: records,
                               started_at,
                               total_duration_ms })
    }

    /// Cierra el pipeline sobre un invoker: `Fn(input) -> resultado`.
    pub fn bind<'a, I>(&'a self, invoker: &'a I) -> impl Fn(Value) -> Result<PipelineRunResult, CoreError> + 'a
        where I: Invoker + ?Sized
    {
        move |input| self.run(invoker, input)
    }
}
