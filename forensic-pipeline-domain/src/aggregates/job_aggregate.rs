// /////////////////////////////////////////////////////////////////////////////
// Forensic Video Pipeline
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! `JobAggregate`: the consistency boundary around one job and its
//! stages.
//!
//! This is a plain in-memory invariant enforcer, not an event-sourced
//! aggregate: application services load a `Job` and its `Stage`s from
//! the [`crate::repositories::JobStore`], fold them into a
//! `JobAggregate`, call a transition method, and persist the result. It
//! has no knowledge of storage.

use crate::entities::{Job, JobStatus, Stage, StageStatus};
use crate::error::ForensicError;
use crate::value_objects::StageName;
use chrono::{DateTime, Utc};

/// A job and the full set of its stage records, with the invariant that
/// `stages` always has exactly one entry per [`StageName`] in
/// [`StageName::ORDER`].
pub struct JobAggregate {
    job: Job,
    stages: Vec<Stage>,
}

impl JobAggregate {
    pub fn new(job: Job, mut stages: Vec<Stage>) -> Result<Self, ForensicError> {
        stages.sort_by_key(|s| s.name.position());
        if stages.len() != StageName::ORDER.len()
            || stages.iter().map(|s| s.name).ne(StageName::ORDER.iter().copied())
        {
            return Err(ForensicError::internal(format!(
                "job {} does not have exactly one stage per fixed stage name",
                job.id
            )));
        }
        Ok(Self { job, stages })
    }

    pub fn job(&self) -> &Job {
        &self.job
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn stage(&self, name: StageName) -> &Stage {
        &self.stages[name.position()]
    }

    fn stage_mut(&mut self, name: StageName) -> &mut Stage {
        &mut self.stages[name.position()]
    }

    /// The next stage eligible to run, following execution order and
    /// requiring its predecessor to have completed. `None` once the job
    /// has finished or stalled on a failure.
    pub fn next_runnable_stage(&self) -> Option<StageName> {
        for name in StageName::ORDER {
            let stage = self.stage(name);
            match stage.status {
                StageStatus::Pending => {
                    let predecessor_done = match name.previous() {
                        None => true,
                        Some(prev) => self.stage(prev).status == StageStatus::Completed,
                    };
                    return predecessor_done.then_some(name);
                }
                StageStatus::Failed => return None,
                _ => continue,
            }
        }
        None
    }

    /// Admits `stage` for execution: transitions the job to `Running` if
    /// this is its first stage, and the stage itself to `Running`.
    pub fn admit(&mut self, stage: StageName, now: DateTime<Utc>) -> Result<(), ForensicError> {
        if self.next_runnable_stage() != Some(stage) {
            return Err(ForensicError::conflict(format!(
                "stage {stage} is not next runnable for job {}",
                self.job.id
            )));
        }
        self.job.mark_running(now)?;
        self.stage_mut(stage).start(now);
        Ok(())
    }

    /// Records a stage's successful result. Completes the job once every
    /// stage has completed.
    pub fn complete_stage(
        &mut self,
        stage: StageName,
        result: serde_json::Value,
        now: DateTime<Utc>,
    ) -> Result<(), ForensicError> {
        if self.stage(stage).status != StageStatus::Running {
            return Err(ForensicError::conflict(format!(
                "stage {stage} is not running for job {}",
                self.job.id
            )));
        }
        self.stage_mut(stage).complete(result, now);
        if self.all_stages_completed() {
            self.job.mark_completed(now)?;
        }
        Ok(())
    }

    /// Records a stage failure and fails the owning job; later pending
    /// stages are left `Pending` rather than force-failed, so a
    /// reprocess can observe exactly where the run stopped.
    pub fn fail_stage(
        &mut self,
        stage: StageName,
        message: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<(), ForensicError> {
        if self.stage(stage).status != StageStatus::Running {
            return Err(ForensicError::conflict(format!(
                "stage {stage} is not running for job {}",
                self.job.id
            )));
        }
        self.stage_mut(stage).fail(message, now);
        self.job.mark_failed(
            format!("stage {stage} failed"),
            now,
        )?;
        Ok(())
    }

    fn all_stages_completed(&self) -> bool {
        self.stages.iter().all(|s| s.status == StageStatus::Completed)
    }

    /// Resets the job and every stage back to pending for a fresh run.
    pub fn reprocess(&mut self, now: DateTime<Utc>) -> Result<(), ForensicError> {
        self.job.reprocess(now)?;
        let attempt = self.job.attempt;
        for stage in &mut self.stages {
            *stage = Stage::pending(self.job.id, stage.name, attempt);
        }
        Ok(())
    }

    pub fn into_parts(self) -> (Job, Vec<Stage>) {
        (self.job, self.stages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value_objects::{FileId, JobId};

    fn new_aggregate() -> JobAggregate {
        let job = Job::new(JobId::new(), FileId::new(), "clip.mp4", None, Utc::now());
        let stages = StageName::ORDER
            .iter()
            .map(|&name| Stage::pending(job.id, name, job.attempt))
            .collect();
        JobAggregate::new(job, stages).unwrap()
    }

    #[test]
    fn rejects_incomplete_stage_sets() {
        let job = Job::new(JobId::new(), FileId::new(), "clip.mp4", None, Utc::now());
        let stages = vec![Stage::pending(job.id, StageName::Prnu, 1)];
        assert!(JobAggregate::new(job, stages).is_err());
    }

    #[test]
    fn admits_stages_in_order() {
        let mut agg = new_aggregate();
        assert_eq!(agg.next_runnable_stage(), Some(StageName::MetadataExtraction));
        agg.admit(StageName::MetadataExtraction, Utc::now()).unwrap();
        assert_eq!(agg.job().status, JobStatus::Running);
        assert_eq!(agg.next_runnable_stage(), None); // metadata is running, not yet completed
    }

    #[test]
    fn rejects_admitting_a_stage_out_of_order() {
        let mut agg = new_aggregate();
        let err = agg.admit(StageName::Prnu, Utc::now()).unwrap_err();
        assert_eq!(err.category(), "conflict");
    }

    #[test]
    fn completing_every_stage_completes_the_job() {
        let mut agg = new_aggregate();
        for name in StageName::ORDER {
            agg.admit(name, Utc::now()).unwrap();
            agg.complete_stage(name, serde_json::json!({}), Utc::now()).unwrap();
        }
        assert_eq!(agg.job().status, JobStatus::Completed);
    }

    #[test]
    fn failing_a_stage_fails_the_job_and_leaves_later_stages_pending() {
        let mut agg = new_aggregate();
        agg.admit(StageName::MetadataExtraction, Utc::now()).unwrap();
        agg.complete_stage(StageName::MetadataExtraction, serde_json::json!({}), Utc::now())
            .unwrap();
        agg.admit(StageName::Prnu, Utc::now()).unwrap();
        agg.fail_stage(StageName::Prnu, "decoder crashed", Utc::now()).unwrap();
        assert_eq!(agg.job().status, JobStatus::Failed);
        assert_eq!(agg.stage(StageName::Fft).status, StageStatus::Pending);
    }

    #[test]
    fn reprocess_resets_all_stages_to_pending() {
        let mut agg = new_aggregate();
        agg.admit(StageName::MetadataExtraction, Utc::now()).unwrap();
        agg.fail_stage(StageName::MetadataExtraction, "oops", Utc::now()).unwrap();
        agg.reprocess(Utc::now()).unwrap();
        assert_eq!(agg.job().status, JobStatus::Pending);
        assert_eq!(agg.job().attempt, 2);
        for name in StageName::ORDER {
            assert_eq!(agg.stage(name).status, StageStatus::Pending);
            assert_eq!(agg.stage(name).attempt, 2);
        }
    }
}
