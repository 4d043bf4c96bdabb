// /////////////////////////////////////////////////////////////////////////////
// Forensic Video Pipeline
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! `ReprocessJob`: a thin wrapper over [`Scheduler::reprocess`] (spec
//! §6.3 `POST /analysis/{id}/reprocess`).

use crate::application::services::Scheduler;
use forensic_pipeline_domain::error::ForensicError;
use forensic_pipeline_domain::value_objects::JobId;
use std::sync::Arc;

pub struct ReprocessJob {
    scheduler: Arc<Scheduler>,
}

impl ReprocessJob {
    pub fn new(scheduler: Arc<Scheduler>) -> Self {
        Self { scheduler }
    }

    pub async fn execute(&self, job_id: JobId) -> Result<(), ForensicError> {
        self.scheduler.reprocess(job_id).await
    }
}
