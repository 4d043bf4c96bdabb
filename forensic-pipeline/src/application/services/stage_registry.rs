// /////////////////////////////////////////////////////////////////////////////
// Forensic Video Pipeline
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! The stage registry (C4): maps each [`StageName`] to the
//! [`StageWorker`] implementation that runs it.
//!
//! Built once at bootstrap from the five infrastructure workers and
//! handed to the executor as `Arc<StageRegistry>`. The executor never
//! matches on `StageName` to decide what to run; it asks the registry.

use forensic_pipeline_domain::error::ForensicError;
use forensic_pipeline_domain::services::StageWorker;
use forensic_pipeline_domain::value_objects::StageName;
use std::collections::HashMap;
use std::sync::Arc;

pub struct StageRegistry {
    workers: HashMap<StageName, Arc<dyn StageWorker>>,
}

impl StageRegistry {
    /// Builds a registry from `workers`, keyed by each worker's own
    /// [`StageWorker::stage_name`]. Panics if `workers` does not cover
    /// every [`StageName::ORDER`] entry exactly once, since a registry
    /// missing a stage is a wiring bug caught at bootstrap, not a
    /// runtime condition the executor should have to handle.
    pub fn new(workers: Vec<Arc<dyn StageWorker>>) -> Self {
        let mut map = HashMap::with_capacity(workers.len());
        for worker in workers {
            let name = worker.stage_name();
            if map.insert(name, worker).is_some() {
                panic!("duplicate StageWorker registered for stage {name}");
            }
        }
        for name in StageName::ORDER {
            if !map.contains_key(&name) {
                panic!("no StageWorker registered for stage {name}");
            }
        }
        Self { workers: map }
    }

    /// Looks up the worker for `name`. A miss here (impossible given
    /// [`StageRegistry::new`]'s exhaustiveness check) is surfaced as an
    /// `Internal` error rather than a panic, since by this point we are
    /// deep inside a job's execution and want to fail that job, not the
    /// process.
    pub fn worker_for(&self, name: StageName) -> Result<&Arc<dyn StageWorker>, ForensicError> {
        self.workers
            .get(&name)
            .ok_or_else(|| ForensicError::internal(format!("no stage worker registered for {name}")))
    }
}
