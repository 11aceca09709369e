use serde::{Deserialize, Serialize};

use crate::hashing::ContentHash;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IdempotencyDiagnosis {
    Idempotent,
    NonDeterministic { distinct_hashes: usize },
    /// Tiene prioridad sobre `NonDeterministic`.
    RunFailures { failed: usize },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    pub iteration: usize,
    pub success: bool,
    pub outcome_hash: ContentHash,
    pub duration_ms: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdempotencyVerdict {
    pub is_idempotent: bool,
    pub iterations: usize,
    pub unique_output_hash_count: usize,
    pub all_succeeded: bool,
    pub failed_runs: usize,
    pub diagnosis: IdempotencyDiagnosis,
    /// Hashes distintos observados, ordenados.
    pub output_hashes: Vec<ContentHash>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runs: Option<Vec<RunRecord>>,
}

impl IdempotencyVerdict {
    pub(crate) fn from_runs(runs: Vec<RunRecord>, keep_runs: bool) -> Self {
        let iterations = runs.len();
        let mut output_hashes: Vec<ContentHash> = runs.iter().map(|r| r.outcome_hash.clone()).collect();
        output_hashes.sort();
        output_hashes.dedup();
        let failed_runs = runs.iter().filter(|r| !r.success).count();
        let unique = output_hashes.len();
        let diagnosis = if failed_runs > 0 {
            IdempotencyDiagnosis::RunFailures { failed: failed_runs }
        } else if unique > 1 {
            IdempotencyDiagnosis::NonDeterministic { distinct_hashes: unique }
        } else {
            IdempotencyDiagnosis::Idempotent
        };
        Self { is_idempotent: unique == 1 && failed_runs == 0,
               iterations,
               unique_output_hash_count: unique,
               all_succeeded: failed_runs == 0,
               failed_runs,
               diagnosis,
               output_hashes,
               runs: keep_runs.then_some(runs) }
    }
}
