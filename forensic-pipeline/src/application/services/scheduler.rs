// /////////////////////////////////////////////////////////////////////////////
// Forensic Video Pipeline
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! The admission scheduler (C7): an unbounded FIFO queue in front of a
//! bounded pool of `worker_pool_size` worker tasks, plus the
//! `reset`/`reprocess` admin operations and the crash-recovery scan run
//! once at bootstrap.
//!
//! `admit` pushes onto a `tokio::mpsc` queue and returns immediately; a
//! single dispatcher task drains it in order, acquiring a
//! `tokio::sync::Semaphore` permit per job so at most `P` executors run
//! concurrently while jobs beyond that bound simply wait in the channel.

use chrono::Utc;
use forensic_pipeline_domain::entities::job::StageStatus;
use forensic_pipeline_domain::entities::JobStatus;
use forensic_pipeline_domain::error::ForensicError;
use forensic_pipeline_domain::repositories::JobStore;
use forensic_pipeline_domain::value_objects::JobId;
use std::sync::Arc;
use tokio::sync::{mpsc, Semaphore};
use tracing::info;

use crate::application::services::executor::Executor;
use crate::infrastructure::runtime::supervisor::spawn_supervised;

pub struct Scheduler {
    job_store: Arc<dyn JobStore>,
    queue: mpsc::UnboundedSender<JobId>,
}

impl Scheduler {
    /// Spawns the dispatcher task and returns a handle to it. The
    /// dispatcher outlives every `Scheduler` clone; dropping all
    /// `Scheduler`s drops the sender, which drains the channel and ends
    /// the dispatcher task.
    pub fn new(executor: Arc<Executor>, job_store: Arc<dyn JobStore>, worker_pool_size: usize) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        spawn_dispatcher(executor, worker_pool_size.max(1), rx);
        Self { job_store, queue: tx }
    }

    /// Enqueues `job_id` for execution. Returns immediately: the actual
    /// run happens on the dispatcher's worker pool, FIFO with respect to
    /// other `admit` calls.
    pub fn admit(&self, job_id: JobId) {
        if self.queue.send(job_id).is_err() {
            tracing::error!(job_id = %job_id, "admission queue's dispatcher is gone, job will not run");
        }
    }

    /// `reset`/`reprocess` (spec §4.7): clears a job back to a fresh
    /// `Pending` run and re-admits it. Rejected with `Conflict` while the
    /// job is `Running`; both operations collapse to the same behavior
    /// in this data model since there is no separate terminal-vs-pending
    /// distinction beyond `JobStatus` itself (see `DESIGN.md`).
    pub async fn reprocess(&self, job_id: JobId) -> Result<(), ForensicError> {
        let mut job = self.job_store.get_job(job_id).await?;
        if job.status == JobStatus::Running {
            return Err(ForensicError::conflict(format!(
                "cannot reprocess job {job_id} while it is running"
            )));
        }

        if job.status != JobStatus::Pending {
            job.reprocess(Utc::now())?;
            self.job_store.update_job(job).await?;
        }

        for mut stage in self.job_store.list_stages(job_id).await? {
            stage.status = StageStatus::Pending;
            stage.started_at = None;
            stage.completed_at = None;
            stage.error_message = None;
            stage.result = None;
            self.job_store.update_stage(stage).await?;
        }

        self.admit(job_id);
        Ok(())
    }

    /// `reset` is the same recovery path as `reprocess` in this data
    /// model; kept as a distinct name because spec §4.7 names it
    /// separately and callers (the CLI, a future admin endpoint) may
    /// want to log the two operations differently.
    pub async fn reset(&self, job_id: JobId) -> Result<(), ForensicError> {
        self.reprocess(job_id).await
    }

    /// Scans for jobs a prior process left `Running` and re-admits each
    /// one. Call once at bootstrap, before serving new requests.
    pub async fn recover_crashed_jobs(&self) -> Result<(), ForensicError> {
        let running = self.job_store.list_running_jobs().await?;
        if running.is_empty() {
            return Ok(());
        }
        info!(count = running.len(), "re-admitting jobs left running by a prior process");
        for job in running {
            self.admit(job.id);
        }
        Ok(())
    }
}

/// Drains `rx` in order, acquiring a permit before spawning each job's
/// run so at most `worker_pool_size` executors are in flight at once.
/// Waiting for a permit here, rather than in `admit`, is what keeps the
/// queue FIFO: a burst of `admit` calls lands in channel order, not in
/// whatever order their individual permit acquisitions happen to wake.
fn spawn_dispatcher(executor: Arc<Executor>, worker_pool_size: usize, mut rx: mpsc::UnboundedReceiver<JobId>) {
    let semaphore = Arc::new(Semaphore::new(worker_pool_size));
    tokio::spawn(async move {
        while let Some(job_id) = rx.recv().await {
            let executor = executor.clone();
            let semaphore = semaphore.clone();
            let permit = match semaphore.acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => break,
            };
            spawn_supervised("job-executor", async move {
                let _permit = permit;
                executor.run(job_id).await
            });
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::artifact_publisher::ArtifactPublisher;
    use crate::application::services::stage_registry::StageRegistry;
    use crate::application::services::webhook_dispatcher::WebhookDispatcher;
    use crate::infrastructure::{HttpWebhookSender, LocalBlobStore, SqliteJobStore};
    use crate::infrastructure::workers::{
        ClassificationWorker, CleaningWorker, FftWorker, MetadataExtractionWorker, PrnuWorker,
    };
    use forensic_pipeline_domain::entities::{FileRecord, Job, Stage};
    use forensic_pipeline_domain::services::BlobStore;
    use forensic_pipeline_domain::value_objects::{FileId, StageName};
    use std::time::Duration;

    async fn new_scheduler() -> (Scheduler, tempfile::TempDir, Arc<SqliteJobStore>, Arc<LocalBlobStore>) {
        let dir = tempfile::tempdir().unwrap();
        let job_store = Arc::new(
            SqliteJobStore::connect(&format!("sqlite://{}/db.sqlite?mode=rwc", dir.path().display()))
                .await
                .unwrap(),
        );
        let blob_store = Arc::new(LocalBlobStore::new(dir.path().join("blobs")));
        let dyn_blob_store: Arc<dyn BlobStore> = blob_store.clone();

        let registry = Arc::new(StageRegistry::new(vec![
            Arc::new(MetadataExtractionWorker::new(dyn_blob_store.clone())),
            Arc::new(PrnuWorker::new(dyn_blob_store.clone())),
            Arc::new(FftWorker::new(dyn_blob_store.clone())),
            Arc::new(ClassificationWorker::default()),
            Arc::new(CleaningWorker::new(dyn_blob_store.clone(), None)),
        ]));
        let publisher = Arc::new(ArtifactPublisher::new(job_store.clone(), blob_store.clone(), None));
        let sender: Arc<dyn forensic_pipeline_domain::services::WebhookSender> =
            Arc::new(HttpWebhookSender::new(Duration::from_secs(10)).unwrap());
        let webhooks = Arc::new(WebhookDispatcher::new(sender, 3));
        let executor = Arc::new(Executor::new(job_store.clone(), dyn_blob_store, registry, publisher, webhooks));

        let scheduler = Scheduler::new(executor, job_store.clone(), 2);
        (scheduler, dir, job_store, blob_store)
    }

    async fn seed_job(job_store: &SqliteJobStore, blob_store: &LocalBlobStore) -> JobId {
        let file_id = FileId::new();
        let (location, sha256) = blob_store.put_with_digest(file_id, b"not actually a video").await.unwrap();
        let record = FileRecord::new(
            file_id,
            "evidence.mp4",
            Some("video/mp4".to_string()),
            20,
            sha256,
            location,
            Utc::now(),
        );
        job_store.save_file(record).await.unwrap();

        let job = Job::new(JobId::new(), file_id, "evidence.mp4", None, Utc::now());
        let job_id = job.id;
        let stages = StageName::ORDER.iter().map(|&n| Stage::pending(job_id, n, job.attempt)).collect();
        job_store.create_job(job, stages).await.unwrap();
        job_id
    }

    #[tokio::test]
    async fn admit_runs_the_job_to_completion() {
        let (scheduler, _dir, job_store, blob_store) = new_scheduler().await;
        let job_id = seed_job(&job_store, &blob_store).await;

        scheduler.admit(job_id);
        tokio::time::sleep(Duration::from_millis(200)).await;

        let job = job_store.get_job(job_id).await.unwrap();
        assert_eq!(job.status, JobStatus::Completed);
    }

    #[tokio::test]
    async fn reprocess_rejects_a_running_job() {
        let (scheduler, _dir, job_store, _blob_store) = new_scheduler().await;
        let job = Job::new(JobId::new(), FileId::new(), "evidence.mp4", None, Utc::now());
        let job_id = job.id;
        let stages = StageName::ORDER.iter().map(|&n| Stage::pending(job_id, n, job.attempt)).collect();
        job_store.create_job(job, stages).await.unwrap();
        job_store.admit_stage(job_id, StageName::MetadataExtraction).await.unwrap();

        let err = scheduler.reprocess(job_id).await.unwrap_err();
        assert_eq!(err.category(), "conflict");
    }

    #[tokio::test]
    async fn reprocess_bumps_attempt_and_resets_stages() {
        let (scheduler, _dir, job_store, blob_store) = new_scheduler().await;
        let job_id = seed_job(&job_store, &blob_store).await;

        scheduler.admit(job_id);
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(job_store.get_job(job_id).await.unwrap().status, JobStatus::Completed);

        scheduler.reprocess(job_id).await.unwrap();
        let job = job_store.get_job(job_id).await.unwrap();
        assert_eq!(job.attempt, 2);

        tokio::time::sleep(Duration::from_millis(200)).await;
        let job = job_store.get_job(job_id).await.unwrap();
        assert_eq!(job.status, JobStatus::Completed);
    }
}
