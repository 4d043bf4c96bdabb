// /////////////////////////////////////////////////////////////////////////////
// Forensic Video Pipeline
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! The pipeline executor (C6): drives one job through its five persisted
//! stages plus the virtual `report_generation` step, persisting every
//! transition before the event that announces it.
//!
//! Resumability falls out of that ordering: re-entering `run` on a job
//! that crashed mid-stage finds the stage still `Running` (demoted to
//! `Pending` before the loop starts, per spec §4.6's resumability note)
//! and simply re-executes it.

use chrono::{DateTime, Utc};
use forensic_pipeline_domain::entities::job::StageStatus;
use forensic_pipeline_domain::entities::{Job, JobStatus, Stage};
use forensic_pipeline_domain::error::ForensicError;
use forensic_pipeline_domain::repositories::JobStore;
use forensic_pipeline_domain::services::{BlobStore, CleaningResult, StageInput, StageResult, WebhookEnvelope, WebhookEventKind};
use forensic_pipeline_domain::value_objects::{JobId, StageName};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{info, warn};

use crate::application::services::artifact_publisher::{ArtifactKind, ArtifactPublisher};
use crate::application::services::progress_aggregator;
use crate::application::services::report_builder;
use crate::application::services::stage_registry::StageRegistry;
use crate::application::services::webhook_dispatcher::WebhookDispatcher;

pub struct Executor {
    job_store: Arc<dyn JobStore>,
    blob_store: Arc<dyn BlobStore>,
    registry: Arc<StageRegistry>,
    publisher: Arc<ArtifactPublisher>,
    webhooks: Arc<WebhookDispatcher>,
}

impl Executor {
    pub fn new(
        job_store: Arc<dyn JobStore>,
        blob_store: Arc<dyn BlobStore>,
        registry: Arc<StageRegistry>,
        publisher: Arc<ArtifactPublisher>,
        webhooks: Arc<WebhookDispatcher>,
    ) -> Self {
        Self {
            job_store,
            blob_store,
            registry,
            publisher,
            webhooks,
        }
    }

    /// Runs `job_id` to completion or failure, per spec §4.6's algorithm.
    /// Safe to call again on a job this same process already ran partway
    /// through, and safe to call on a job a prior process started and
    /// never finished.
    pub async fn run(&self, job_id: JobId) -> Result<(), ForensicError> {
        let mut job = self.job_store.get_job(job_id).await?;
        if job.status == JobStatus::Completed {
            return Ok(());
        }

        let mut stages = self.job_store.list_stages(job_id).await?;
        self.demote_stale_running_stages(&mut stages).await?;

        if job.status == JobStatus::Pending {
            job.mark_running(Utc::now())?;
            self.job_store.update_job(job.clone()).await?;
            self.emit(&job, WebhookEventKind::Started, None, serde_json::json!({})).await;
        }

        for name in StageName::ORDER {
            let already_done = stages
                .iter()
                .find(|s| s.name == name)
                .map(|s| s.status == StageStatus::Completed)
                .unwrap_or(false);

            if already_done {
                continue;
            }

            if let Err(e) = self.run_stage(&job, name, &mut stages).await {
                self.fail_job(&mut job, &e).await?;
                return Err(e);
            }

            if name == StageName::Classification {
                self.run_report_generation(&job, &stages).await;
            }
        }

        job.mark_completed(Utc::now())?;
        self.job_store.update_job(job.clone()).await?;
        self.emit(&job, WebhookEventKind::Completed, None, serde_json::json!({})).await;
        info!(job_id = %job_id, "job completed");
        Ok(())
    }

    /// A stage left `Running` by a process that crashed mid-stage is
    /// treated as `Pending` and re-executed from scratch; workers are
    /// required to be safe to re-run.
    async fn demote_stale_running_stages(&self, stages: &mut [Stage]) -> Result<(), ForensicError> {
        for stage in stages.iter_mut() {
            if stage.status == StageStatus::Running {
                stage.status = StageStatus::Pending;
                stage.started_at = None;
                self.job_store.update_stage(stage.clone()).await?;
            }
        }
        Ok(())
    }

    /// Runs one persisted stage, updating `stages` in place so each emitted
    /// event's payload reflects the job's full state rather than just this
    /// stage's own result.
    async fn run_stage(&self, job: &Job, name: StageName, stages: &mut [Stage]) -> Result<(), ForensicError> {
        let (_admitted_job, mut stage) = self.job_store.admit_stage(job.id, name).await?;
        Self::replace_stage(stages, &stage);
        self.emit(job, WebhookEventKind::StepStarted, Some(name), self.step_payload(stages, Self::stage_view(&stage))).await;

        let prior_results = self.prior_results(job.id, name).await?;
        let input = StageInput::with_prior_results(job.source_file, prior_results);

        let worker = self.registry.worker_for(name)?;
        let outcome = worker.run(input).await;

        match outcome {
            Ok(result) => {
                if let StageResult::Cleaning(cleaning) = &result {
                    self.publish_clean_video_if_present(job, cleaning).await;
                }

                let payload = serde_json::to_value(&result)
                    .map_err(|e| ForensicError::internal(format!("failed to serialize stage result: {e}")))?;
                stage.complete(payload, Utc::now());
                self.job_store.update_stage(stage.clone()).await?;
                Self::replace_stage(stages, &stage);

                self.emit(job, WebhookEventKind::StepCompleted, Some(name), self.step_payload(stages, Self::stage_view(&stage))).await;
                Ok(())
            }
            Err(e) => {
                stage.fail(e.to_string(), Utc::now());
                self.job_store.update_stage(stage.clone()).await?;
                Self::replace_stage(stages, &stage);
                Err(e)
            }
        }
    }

    fn replace_stage(stages: &mut [Stage], updated: &Stage) {
        if let Some(slot) = stages.iter_mut().find(|s| s.name == updated.name) {
            *slot = updated.clone();
        }
    }

    /// A JSON view of one stage for webhook payloads (spec §4.5): name,
    /// state, timestamps, duration, and the worker's result once completed.
    fn stage_view(stage: &Stage) -> Value {
        json!({
            "name": stage.name.as_str(),
            "state": stage.status.as_str(),
            "started_at": stage.started_at.map(|t| t.to_rfc3339()),
            "completed_at": stage.completed_at.map(|t| t.to_rfc3339()),
            "duration_seconds": stage.duration().map(|d| d.num_milliseconds() as f64 / 1000.0),
            "result": stage.result,
        })
    }

    /// The full step-event payload (spec §4.5): the stage the event is
    /// about, the completed stages with their durations and results, the
    /// names of the stages still pending, and the aggregate statistics of
    /// §4.8 folded from the same `stages` snapshot.
    fn step_payload(&self, stages: &[Stage], current: Value) -> Value {
        let completed: Vec<Value> = stages
            .iter()
            .filter(|s| s.status == StageStatus::Completed)
            .map(Self::stage_view)
            .collect();
        let pending: Vec<&str> = stages
            .iter()
            .filter(|s| s.status == StageStatus::Pending)
            .map(|s| s.name.as_str())
            .collect();
        let progress = progress_aggregator::compute(stages);

        json!({
            "stage": current,
            "completed_stages": completed,
            "pending_stages": pending,
            "progress": progress,
        })
    }

    /// Re-reads the original file's bytes through the executor's own
    /// blob store handle and publishes them as the job's `clean_video`
    /// artifact. The cleaning worker itself never touches storage; it
    /// only reports whether cleaning happened.
    async fn publish_clean_video_if_present(&self, job: &Job, cleaning: &CleaningResult) {
        if cleaning.skipped {
            return;
        }
        let bytes = match self.blob_store.get(job.source_file).await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(job_id = %job.id, error = ?e, "could not re-read original bytes to publish clean_video");
                return;
            }
        };
        if let Err(e) = self
            .publisher
            .publish(job.id, ArtifactKind::CleanVideo, bytes, &job.original_filename, None)
            .await
        {
            warn!(job_id = %job.id, error = ?e, "failed to publish clean_video artifact");
        }
    }

    /// The virtual `report_generation` step between `classification` and
    /// `cleaning`. Non-fatal: any failure here is logged and leaves
    /// `report_file_id` absent, never fails the job.
    async fn run_report_generation(&self, job: &Job, stages: &[Stage]) {
        let started_at = Utc::now();
        let starting_view = Self::report_stage_view("running", started_at, None, None);
        self.emit(job, WebhookEventKind::StepStarted, None, self.step_payload(stages, starting_view)).await;

        let report: Value = report_builder::build_report(job, stages);
        let bytes = match serde_json::to_vec_pretty(&report) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(job_id = %job.id, error = ?e, "failed to serialize report, leaving report_file_id absent");
                return;
            }
        };

        match self
            .publisher
            .publish(job.id, ArtifactKind::Report, bytes, "report.json", Some("application/json".to_string()))
            .await
        {
            Ok(_file_id) => {
                let completed_view = Self::report_stage_view("completed", started_at, Some(Utc::now()), Some(report));
                self.emit(job, WebhookEventKind::StepCompleted, None, self.step_payload(stages, completed_view)).await;
            }
            Err(e) => {
                warn!(job_id = %job.id, error = ?e, "failed to publish report, leaving report_file_id absent");
            }
        }
    }

    /// `report_generation` is a virtual step with no persisted `Stage` row
    /// (see `DESIGN.md`), so its payload view is built by hand rather than
    /// from one of the job's own `Stage` rows.
    fn report_stage_view(state: &str, started_at: DateTime<Utc>, completed_at: Option<DateTime<Utc>>, result: Option<Value>) -> Value {
        let duration_seconds = completed_at.map(|end| (end - started_at).num_milliseconds() as f64 / 1000.0);
        json!({
            "name": "report_generation",
            "state": state,
            "started_at": started_at.to_rfc3339(),
            "completed_at": completed_at.map(|t| t.to_rfc3339()),
            "duration_seconds": duration_seconds,
            "result": result,
        })
    }

    async fn prior_results(&self, job_id: JobId, before: StageName) -> Result<Vec<StageResult>, ForensicError> {
        let mut results = Vec::new();
        for name in StageName::ORDER {
            if name == before {
                break;
            }
            let stage = self.job_store.get_stage(job_id, name).await?;
            if let Some(value) = stage.result {
                if let Ok(result) = serde_json::from_value::<StageResult>(value) {
                    results.push(result);
                }
            }
        }
        Ok(results)
    }

    async fn fail_job(&self, job: &mut Job, error: &ForensicError) -> Result<(), ForensicError> {
        job.mark_failed(error.to_string(), Utc::now())?;
        self.job_store.update_job(job.clone()).await?;
        self.emit(job, WebhookEventKind::Failed, None, serde_json::json!({"error": error.to_string()})).await;
        warn!(job_id = %job.id, error = ?error, "job failed");
        Ok(())
    }

    async fn emit(&self, job: &Job, event: WebhookEventKind, stage: Option<StageName>, data: Value) {
        let Some(url) = job.webhook_url.as_deref() else {
            return;
        };
        let envelope = WebhookEnvelope::new(event, job.id, Utc::now(), stage, data);
        self.webhooks.dispatch(url, envelope).await;
    }
}
