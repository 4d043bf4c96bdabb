// /////////////////////////////////////////////////////////////////////////////
// Forensic Video Pipeline
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! The `Job` entity: one submitted video, tracked from upload through the
//! five analysis stages to a final report.

use crate::error::ForensicError;
use crate::value_objects::{datetime_serde, FileId, JobId, StageName};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Where a job currently sits in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// File accepted, stages not yet admitted to a worker.
    Pending,
    /// At least one stage has started.
    Running,
    /// Every stage completed successfully; report available.
    Completed,
    /// A stage returned an unrecoverable error.
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Running => "running",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }

    /// Terminal statuses never transition further on their own; only an
    /// explicit `reprocess` request moves out of them.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

/// A submitted video analysis job.
///
/// `source_file` is set at creation time once the upload completes;
/// `stages` is populated by the scheduler when the job is admitted, one
/// entry per [`StageName`] in [`StageName::ORDER`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub source_file: FileId,
    pub original_filename: String,
    pub status: JobStatus,
    #[serde(with = "datetime_serde")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "datetime_serde::optional")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(with = "datetime_serde::optional")]
    pub completed_at: Option<DateTime<Utc>>,
    pub failure_reason: Option<String>,
    pub webhook_url: Option<String>,
    /// Bumped every time the job is reprocessed; distinguishes webhook
    /// deliveries and report generations across runs of the same job id.
    pub attempt: u32,
    /// Set once the `report_generation` virtual stage publishes a report
    /// file. Best-effort: absent does not prevent the job from
    /// completing (spec §4.6 step g).
    pub report_file_id: Option<FileId>,
    /// Set once the `cleaning` stage publishes a sanitized copy. Absent
    /// when the stage was skipped (no external encoder configured).
    pub clean_video_id: Option<FileId>,
}

impl Job {
    pub fn new(
        id: JobId,
        source_file: FileId,
        original_filename: impl Into<String>,
        webhook_url: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            source_file,
            original_filename: original_filename.into(),
            status: JobStatus::Pending,
            created_at: now,
            started_at: None,
            completed_at: None,
            failure_reason: None,
            webhook_url,
            attempt: 1,
            report_file_id: None,
            clean_video_id: None,
        }
    }

    /// Points the job's `report` slot at a newly published FileRecord,
    /// per C9's idempotence rule: replaces whatever was there before.
    pub fn set_report_file(&mut self, id: FileId) {
        self.report_file_id = Some(id);
    }

    /// Points the job's `clean_video` slot at a newly published
    /// FileRecord.
    pub fn set_clean_video(&mut self, id: FileId) {
        self.clean_video_id = Some(id);
    }

    /// Transitions `Pending -> Running` when the first stage is admitted.
    pub fn mark_running(&mut self, now: DateTime<Utc>) -> Result<(), ForensicError> {
        match self.status {
            JobStatus::Pending => {
                self.status = JobStatus::Running;
                self.started_at = Some(now);
                Ok(())
            }
            JobStatus::Running => Ok(()),
            other => Err(ForensicError::conflict(format!(
                "cannot mark job {} running from status {}",
                self.id,
                other.as_str()
            ))),
        }
    }

    pub fn mark_completed(&mut self, now: DateTime<Utc>) -> Result<(), ForensicError> {
        if self.status != JobStatus::Running {
            return Err(ForensicError::conflict(format!(
                "cannot complete job {} from status {}",
                self.id,
                self.status.as_str()
            )));
        }
        self.status = JobStatus::Completed;
        self.completed_at = Some(now);
        Ok(())
    }

    pub fn mark_failed(&mut self, reason: impl Into<String>, now: DateTime<Utc>) -> Result<(), ForensicError> {
        if self.status.is_terminal() {
            return Err(ForensicError::conflict(format!(
                "cannot fail job {} already in terminal status {}",
                self.id,
                self.status.as_str()
            )));
        }
        self.status = JobStatus::Failed;
        self.failure_reason = Some(reason.into());
        self.completed_at = Some(now);
        Ok(())
    }

    /// Resets a terminal job back to `Pending` for a fresh run of all
    /// stages, bumping `attempt` so downstream consumers (webhooks,
    /// reports) can tell runs apart.
    pub fn reprocess(&mut self, now: DateTime<Utc>) -> Result<(), ForensicError> {
        if !self.status.is_terminal() {
            return Err(ForensicError::conflict(format!(
                "cannot reprocess job {} while status is {}",
                self.id,
                self.status.as_str()
            )));
        }
        self.status = JobStatus::Pending;
        self.started_at = None;
        self.completed_at = None;
        self.failure_reason = None;
        self.attempt += 1;
        self.created_at = now;
        Ok(())
    }
}

/// Per-stage execution status, persisted separately from [`Job`] so the
/// executor can update one stage's row without a write to the job row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl StageStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StageStatus::Pending => "pending",
            StageStatus::Running => "running",
            StageStatus::Completed => "completed",
            StageStatus::Failed => "failed",
        }
    }
}

/// A snapshot of every stage's status for one job, keyed by [`StageName`]
/// in execution order. Used by the executor to decide what runs next and
/// by the report builder to assemble the final JSON.
#[derive(Debug, Clone, Default)]
pub struct JobProgress {
    statuses: BTreeMap<StageName, StageStatus>,
}

impl JobProgress {
    pub fn new() -> Self {
        let mut statuses = BTreeMap::new();
        for stage in StageName::ORDER {
            statuses.insert(stage, StageStatus::Pending);
        }
        Self { statuses }
    }

    pub fn set(&mut self, stage: StageName, status: StageStatus) {
        self.statuses.insert(stage, status);
    }

    pub fn get(&self, stage: StageName) -> StageStatus {
        self.statuses
            .get(&stage)
            .copied()
            .unwrap_or(StageStatus::Pending)
    }

    /// The next stage whose predecessor has completed and which is itself
    /// still pending, if any. Returns `None` once every stage is completed
    /// or the chain has stalled on a failure.
    pub fn next_runnable(&self) -> Option<StageName> {
        for stage in StageName::ORDER {
            match self.get(stage) {
                StageStatus::Pending => {
                    let predecessor_done = match stage.previous() {
                        None => true,
                        Some(prev) => self.get(prev) == StageStatus::Completed,
                    };
                    return predecessor_done.then_some(stage);
                }
                StageStatus::Failed => return None,
                _ => continue,
            }
        }
        None
    }

    pub fn all_completed(&self) -> bool {
        StageName::ORDER
            .iter()
            .all(|s| self.get(*s) == StageStatus::Completed)
    }

    pub fn any_failed(&self) -> bool {
        StageName::ORDER
            .iter()
            .any(|s| self.get(*s) == StageStatus::Failed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value_objects::{FileId, JobId};

    fn new_job() -> Job {
        Job::new(JobId::new(), FileId::new(), "evidence.mp4", None, Utc::now())
    }

    #[test]
    fn new_job_starts_pending() {
        let job = new_job();
        assert_eq!(job.status, JobStatus::Pending);
        assert_eq!(job.attempt, 1);
    }

    #[test]
    fn pending_to_running_to_completed_happy_path() {
        let mut job = new_job();
        job.mark_running(Utc::now()).unwrap();
        assert_eq!(job.status, JobStatus::Running);
        assert!(job.started_at.is_some());
        job.mark_completed(Utc::now()).unwrap();
        assert_eq!(job.status, JobStatus::Completed);
        assert!(job.completed_at.is_some());
    }

    #[test]
    fn cannot_complete_a_pending_job() {
        let mut job = new_job();
        let err = job.mark_completed(Utc::now()).unwrap_err();
        assert_eq!(err.category(), "conflict");
    }

    #[test]
    fn cannot_fail_a_terminal_job() {
        let mut job = new_job();
        job.mark_running(Utc::now()).unwrap();
        job.mark_completed(Utc::now()).unwrap();
        let err = job.mark_failed("boom", Utc::now()).unwrap_err();
        assert_eq!(err.category(), "conflict");
    }

    #[test]
    fn reprocess_resets_terminal_job_and_bumps_attempt() {
        let mut job = new_job();
        job.mark_running(Utc::now()).unwrap();
        job.mark_failed("worker crashed", Utc::now()).unwrap();
        job.reprocess(Utc::now()).unwrap();
        assert_eq!(job.status, JobStatus::Pending);
        assert_eq!(job.attempt, 2);
        assert!(job.failure_reason.is_none());
    }

    #[test]
    fn reprocess_rejects_non_terminal_job() {
        let mut job = new_job();
        job.mark_running(Utc::now()).unwrap();
        let err = job.reprocess(Utc::now()).unwrap_err();
        assert_eq!(err.category(), "conflict");
    }

    #[test]
    fn progress_runs_stages_in_order() {
        let mut progress = JobProgress::new();
        assert_eq!(progress.next_runnable(), Some(StageName::MetadataExtraction));
        progress.set(StageName::MetadataExtraction, StageStatus::Completed);
        assert_eq!(progress.next_runnable(), Some(StageName::Prnu));
    }

    #[test]
    fn progress_stalls_after_a_failure() {
        let mut progress = JobProgress::new();
        progress.set(StageName::MetadataExtraction, StageStatus::Failed);
        assert_eq!(progress.next_runnable(), None);
        assert!(progress.any_failed());
    }

    #[test]
    fn progress_reports_all_completed() {
        let mut progress = JobProgress::new();
        for stage in StageName::ORDER {
            progress.set(stage, StageStatus::Completed);
        }
        assert!(progress.all_completed());
        assert_eq!(progress.next_runnable(), None);
    }
}
