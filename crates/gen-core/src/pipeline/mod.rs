//! Composición secuencial de operaciones memoizadas.
//!
//! El paso 0 recibe `initial_input` como primer argumento; cada paso
//! siguiente recibe el `value` del resultado anterior seguido de sus
//! argumentos estáticos. El primer paso con `success == false` corta la
//! ejecución.

mod composer;
mod invoker;
mod run_result;
mod step;

pub use composer::Pipeline;
pub use invoker::Invoker;
pub use run_result::{FailedStep, PipelineRunResult, StepRecord};
pub use step::PipelineStep;
