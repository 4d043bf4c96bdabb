// /////////////////////////////////////////////////////////////////////////////
// Forensic Video Pipeline
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! The progress aggregator (C8): a pure function from a job's stage
//! records to the summary statistics a status query or webhook payload
//! reports. No `&mut self`, no I/O — callers fold in whatever `Stage`
//! rows they already loaded from C3.

use forensic_pipeline_domain::entities::job::StageStatus;
use forensic_pipeline_domain::entities::Stage;
use serde::Serialize;

/// Aggregate statistics over one job's stage records.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProgressSnapshot {
    pub completed_count: usize,
    pub running_count: usize,
    pub pending_count: usize,
    pub progress_percentage: f64,
    pub total_duration_seconds: f64,
    pub estimated_remaining_seconds: Option<f64>,
}

/// Folds `stages` into a [`ProgressSnapshot`].
///
/// `stages` is expected to be the job's five persisted analysis stages.
/// `upload` is not a persisted `Stage` row in this domain — see
/// `DESIGN.md` — but spec §4.8 counts it as a sixth, always-`Completed`
/// step of the canonical list, so it is folded in here by hand rather
/// than by the caller synthesizing a row for it.
pub fn compute(stages: &[Stage]) -> ProgressSnapshot {
    const UPLOAD_STEP: f64 = 1.0;
    let total_steps = stages.len() as f64 + UPLOAD_STEP;

    let completed_count = 1 + stages.iter().filter(|s| s.status == StageStatus::Completed).count();
    let running_count = stages.iter().filter(|s| s.status == StageStatus::Running).count();
    let pending_count = stages.iter().filter(|s| s.status == StageStatus::Pending).count();

    let progress_percentage =
        (completed_count as f64 + 0.5 * running_count as f64) / total_steps * 100.0;

    let completed_durations: Vec<f64> = stages
        .iter()
        .filter(|s| s.status == StageStatus::Completed)
        .filter_map(|s| s.duration())
        .map(|d| d.num_milliseconds() as f64 / 1000.0)
        .collect();

    let total_duration_seconds: f64 = completed_durations.iter().sum();

    let estimated_remaining_seconds = if completed_durations.is_empty() {
        None
    } else {
        let mean = total_duration_seconds / completed_durations.len() as f64;
        Some(mean * pending_count as f64)
    };

    ProgressSnapshot {
        completed_count,
        running_count,
        pending_count,
        progress_percentage,
        total_duration_seconds,
        estimated_remaining_seconds,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use forensic_pipeline_domain::value_objects::{JobId, StageName};

    fn stage(name: StageName, status: StageStatus) -> Stage {
        let mut stage = Stage::pending(JobId::new(), name, 1);
        stage.status = status;
        if status == StageStatus::Completed {
            let t0 = Utc::now();
            stage.started_at = Some(t0);
            stage.completed_at = Some(t0 + chrono::Duration::seconds(4));
        }
        stage
    }

    #[test]
    fn all_pending_only_counts_the_upload_step_as_done() {
        let stages: Vec<Stage> = forensic_pipeline_domain::value_objects::StageName::ORDER
            .iter()
            .map(|&n| stage(n, StageStatus::Pending))
            .collect();
        let snapshot = compute(&stages);
        // (1 upload completed + 0 of 5 stages) / 6 * 100
        assert_eq!(snapshot.progress_percentage, 100.0 / 6.0);
        assert_eq!(snapshot.completed_count, 1);
        assert!(snapshot.estimated_remaining_seconds.is_none());
    }

    #[test]
    fn all_completed_is_one_hundred_percent() {
        let stages: Vec<Stage> = StageName::ORDER
            .iter()
            .map(|&n| stage(n, StageStatus::Completed))
            .collect();
        let snapshot = compute(&stages);
        assert_eq!(snapshot.progress_percentage, 100.0);
        assert_eq!(snapshot.completed_count, 6);
        assert_eq!(snapshot.pending_count, 0);
        assert_eq!(snapshot.total_duration_seconds, 20.0);
    }

    #[test]
    fn running_stage_counts_as_half_complete() {
        let mut stages: Vec<Stage> = StageName::ORDER
            .iter()
            .map(|&n| stage(n, StageStatus::Pending))
            .collect();
        stages[0] = stage(StageName::MetadataExtraction, StageStatus::Completed);
        stages[1] = stage(StageName::Prnu, StageStatus::Running);
        let snapshot = compute(&stages);
        // (1 upload + 1 completed + 0.5 running) / 6 * 100
        assert_eq!(snapshot.progress_percentage, 250.0 / 6.0);
        assert_eq!(snapshot.estimated_remaining_seconds, Some(4.0 * 3.0));
    }
}
