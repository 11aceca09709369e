use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use gen_core::{ContentHash, PipelineRunResult};
use serde::{Deserialize, Serialize};

/// Resumen de una ejecución de pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    pub pipeline: String,
    pub pipeline_id: ContentHash,
    pub success: bool,
    pub duration_ms: f64,
    pub steps: usize,
    pub cache_hits: usize,
    pub started_at: DateTime<Utc>,
}

impl RunRecord {
    pub fn from_run(pipeline: &str, run: &PipelineRunResult) -> Self {
        Self { pipeline: pipeline.to_string(),
               pipeline_id: run.pipeline_id.clone(),
               success: run.success,
               duration_ms: run.total_duration_ms,
               steps: run.steps.len(),
               cache_hits: run.cache_hits(),
               started_at: run.started_at }
    }
}

/// Lista acotada de ejecuciones (descarta las más antiguas).
#[derive(Debug)]
pub struct RunLog {
    capacity: usize,
    records: Mutex<VecDeque<RunRecord>>,
}

impl RunLog {
    pub fn with_capacity(capacity: usize) -> Self {
        Self { capacity,
               records: Mutex::new(VecDeque::new()) }
    }

    fn guard(&self) -> MutexGuard<'_, VecDeque<RunRecord>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn push(&self, record: RunRecord) {
        if self.capacity == 0 {
            return;
        }
        let mut records = self.guard();
        while records.len() >= self.capacity {
            records.pop_front();
        }
        records.push_back(record);
    }

    pub fn list(&self) -> Vec<RunRecord> {
        self.guard().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.guard().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.guard().clear();
    }
}
