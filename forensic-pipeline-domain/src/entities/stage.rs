// /////////////////////////////////////////////////////////////////////////////
// Forensic Video Pipeline
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! The `Stage` entity: one persisted row recording a single analysis
//! stage's run against a job.

use crate::entities::job::StageStatus;
use crate::value_objects::{datetime_serde, JobId, StageName};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One stage's execution record for one job attempt.
///
/// `result` is `None` until the stage completes; it holds the
/// stage-specific analyzer output once it does. `attempt` mirrors
/// [`crate::entities::job::Job::attempt`] so a reprocessed job's stage
/// history doesn't collide with its previous run in storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stage {
    pub job_id: JobId,
    pub name: StageName,
    pub attempt: u32,
    pub status: StageStatus,
    #[serde(with = "datetime_serde::optional")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(with = "datetime_serde::optional")]
    pub completed_at: Option<DateTime<Utc>>,
    pub error_message: Option<String>,
    pub result: Option<serde_json::Value>,
}

impl Stage {
    pub fn pending(job_id: JobId, name: StageName, attempt: u32) -> Self {
        Self {
            job_id,
            name,
            attempt,
            status: StageStatus::Pending,
            started_at: None,
            completed_at: None,
            error_message: None,
            result: None,
        }
    }

    pub fn start(&mut self, now: DateTime<Utc>) {
        self.status = StageStatus::Running;
        self.started_at = Some(now);
    }

    pub fn complete(&mut self, result: serde_json::Value, now: DateTime<Utc>) {
        self.status = StageStatus::Completed;
        self.completed_at = Some(now);
        self.result = Some(result);
    }

    pub fn fail(&mut self, message: impl Into<String>, now: DateTime<Utc>) {
        self.status = StageStatus::Failed;
        self.completed_at = Some(now);
        self.error_message = Some(message.into());
    }

    /// Wall-clock duration of the run, once both timestamps are set.
    pub fn duration(&self) -> Option<chrono::Duration> {
        match (self.started_at, self.completed_at) {
            (Some(start), Some(end)) => Some(end - start),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value_objects::JobId;

    #[test]
    fn pending_stage_has_no_timestamps() {
        let stage = Stage::pending(JobId::new(), StageName::Prnu, 1);
        assert_eq!(stage.status, StageStatus::Pending);
        assert!(stage.started_at.is_none());
        assert!(stage.duration().is_none());
    }

    #[test]
    fn completing_records_result_and_duration() {
        let mut stage = Stage::pending(JobId::new(), StageName::Fft, 1);
        let t0 = Utc::now();
        stage.start(t0);
        let t1 = t0 + chrono::Duration::seconds(5);
        stage.complete(serde_json::json!({"peak_frequency": 12.5}), t1);
        assert_eq!(stage.status, StageStatus::Completed);
        assert_eq!(stage.duration(), Some(chrono::Duration::seconds(5)));
        assert!(stage.result.is_some());
    }

    #[test]
    fn failing_records_error_message() {
        let mut stage = Stage::pending(JobId::new(), StageName::Cleaning, 1);
        stage.start(Utc::now());
        stage.fail("decoder crashed", Utc::now());
        assert_eq!(stage.status, StageStatus::Failed);
        assert_eq!(stage.error_message.as_deref(), Some("decoder crashed"));
    }
}
