// /////////////////////////////////////////////////////////////////////////////
// Forensic Video Pipeline
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! `CompleteUpload`: reassembles a finished chunked upload into a `Job`
//! and admits it (spec §6.1 `POST /upload/complete/{upload_id}`).

use crate::application::services::{ArtifactPublisher, Scheduler, WebhookDispatcher};
use crate::infrastructure::ChunkAssembler;
use chrono::Utc;
use forensic_pipeline_domain::entities::{Job, Stage};
use forensic_pipeline_domain::error::ForensicError;
use forensic_pipeline_domain::services::{WebhookEnvelope, WebhookEventKind};
use forensic_pipeline_domain::value_objects::{FileId, JobId, StageName, UploadId};
use std::sync::Arc;

pub struct CompleteUpload {
    assembler: Arc<ChunkAssembler>,
    publisher: Arc<ArtifactPublisher>,
    scheduler: Arc<Scheduler>,
    webhooks: Arc<WebhookDispatcher>,
}

impl CompleteUpload {
    pub fn new(
        assembler: Arc<ChunkAssembler>,
        publisher: Arc<ArtifactPublisher>,
        scheduler: Arc<Scheduler>,
        webhooks: Arc<WebhookDispatcher>,
    ) -> Self {
        Self {
            assembler,
            publisher,
            scheduler,
            webhooks,
        }
    }

    /// Reassembles `upload_id`'s chunks, creates the job and its five
    /// pending stages together with the `original` artifact, emits
    /// `analysis.upload.completed`, and admits the job to the scheduler.
    /// Returns the new job's id; the job has not necessarily started
    /// running by the time this returns.
    pub async fn execute(&self, upload_id: UploadId, webhook_url: Option<String>) -> Result<JobId, ForensicError> {
        let (bytes, _sha256, upload) = self.assembler.complete(upload_id).await?;
        finalize_upload(
            &self.publisher,
            &self.scheduler,
            &self.webhooks,
            upload.original_filename,
            bytes,
            webhook_url,
        )
        .await
    }
}

/// Creates the job, its five pending stage rows, and the `original`
/// artifact's `FileRecord` in one transaction (spec §4.3), emits
/// `analysis.upload.completed` (spec §6.1, §8), and admits the job.
/// Shared by [`CompleteUpload`] and `AnalyzeSingleShot`, since the latter
/// drives the same chunked-upload path internally for one call.
pub(crate) async fn finalize_upload(
    publisher: &Arc<ArtifactPublisher>,
    scheduler: &Arc<Scheduler>,
    webhooks: &Arc<WebhookDispatcher>,
    original_filename: String,
    bytes: Vec<u8>,
    webhook_url: Option<String>,
) -> Result<JobId, ForensicError> {
    let job_id = JobId::new();
    let file_id = FileId::new();
    let job = Job::new(job_id, file_id, original_filename.clone(), webhook_url.clone(), Utc::now());
    let stages = StageName::ORDER
        .iter()
        .map(|&name| Stage::pending(job_id, name, job.attempt))
        .collect();

    publisher
        .publish_original_for_new_job(file_id, job, stages, bytes, original_filename)
        .await?;

    if let Some(url) = webhook_url.as_deref() {
        let envelope = WebhookEnvelope::new(WebhookEventKind::UploadCompleted, job_id, Utc::now(), None, serde_json::json!({}));
        webhooks.dispatch(url, envelope).await;
    }

    scheduler.admit(job_id);
    Ok(job_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::{Executor, StageRegistry, WebhookDispatcher};
    use crate::infrastructure::workers::{
        ClassificationWorker, CleaningWorker, FftWorker, MetadataExtractionWorker, PrnuWorker,
    };
    use crate::infrastructure::{HttpWebhookSender, LocalBlobStore, SqliteJobStore};
    use forensic_pipeline_domain::entities::JobStatus;
    use forensic_pipeline_domain::services::BlobStore;
    use std::time::Duration;
    use tokio::sync::Mutex as TokioMutex;

    async fn new_complete_upload() -> (CompleteUpload, Arc<ChunkAssembler>, tempfile::TempDir, Arc<SqliteJobStore>) {
        let dir = tempfile::tempdir().unwrap();
        let job_store = Arc::new(
            SqliteJobStore::connect(&format!("sqlite://{}/db.sqlite?mode=rwc", dir.path().display()))
                .await
                .unwrap(),
        );
        let blob_store = Arc::new(LocalBlobStore::new(dir.path().join("blobs")));
        let dyn_blob_store: Arc<dyn BlobStore> = blob_store.clone();
        let assembler = Arc::new(ChunkAssembler::new(dir.path(), job_store.clone()));
        let publisher = Arc::new(ArtifactPublisher::new(job_store.clone(), blob_store, None));

        let registry = Arc::new(StageRegistry::new(vec![
            Arc::new(MetadataExtractionWorker::new(dyn_blob_store.clone())),
            Arc::new(PrnuWorker::new(dyn_blob_store.clone())),
            Arc::new(FftWorker::new(dyn_blob_store.clone())),
            Arc::new(ClassificationWorker::default()),
            Arc::new(CleaningWorker::new(dyn_blob_store.clone(), None)),
        ]));
        let sender: Arc<dyn forensic_pipeline_domain::services::WebhookSender> =
            Arc::new(HttpWebhookSender::new(Duration::from_secs(10)).unwrap());
        let webhooks = Arc::new(WebhookDispatcher::new(sender, 3));
        let executor = Arc::new(Executor::new(
            job_store.clone(),
            dyn_blob_store,
            registry,
            publisher.clone(),
            webhooks.clone(),
        ));
        let scheduler = Arc::new(Scheduler::new(executor, job_store.clone(), 2));

        (
            CompleteUpload::new(assembler.clone(), publisher, scheduler, webhooks),
            assembler,
            dir,
            job_store,
        )
    }

    #[tokio::test]
    async fn completing_an_upload_creates_and_runs_a_job() {
        let (use_case, assembler, _dir, job_store) = new_complete_upload().await;
        let upload = assembler
            .init("evidence.mp4", 5, "video/mp4", 10_000, 5, &["mp4"], &["video/mp4"])
            .await
            .unwrap();
        assembler.put_chunk(upload.id, 0, b"hello").await.unwrap();

        let job_id = use_case.execute(upload.id, None).await.unwrap();
        tokio::time::sleep(Duration::from_millis(200)).await;

        let job = job_store.get_job(job_id).await.unwrap();
        assert_eq!(job.original_filename, "evidence.mp4");
        assert_eq!(job.status, JobStatus::Completed);
        assert!(job.report_file_id.is_some());
    }

    #[tokio::test]
    async fn completing_an_incomplete_upload_is_rejected() {
        let (use_case, assembler, _dir, _job_store) = new_complete_upload().await;
        let upload = assembler
            .init("evidence.mp4", 10, "video/mp4", 10_000, 5, &["mp4"], &["video/mp4"])
            .await
            .unwrap();
        assembler.put_chunk(upload.id, 0, b"right").await.unwrap();

        let err = use_case.execute(upload.id, None).await.unwrap_err();
        assert_eq!(err.category(), "conflict");
    }

    struct RecordingSender {
        events: TokioMutex<Vec<WebhookEventKind>>,
    }

    #[async_trait::async_trait]
    impl forensic_pipeline_domain::services::WebhookSender for RecordingSender {
        async fn send(&self, _url: &str, envelope: &WebhookEnvelope) -> Result<(), ForensicError> {
            self.events.lock().await.push(envelope.event);
            Ok(())
        }
    }

    #[tokio::test]
    async fn completing_an_upload_emits_upload_completed_before_started() {
        let dir = tempfile::tempdir().unwrap();
        let job_store = Arc::new(
            SqliteJobStore::connect(&format!("sqlite://{}/db.sqlite?mode=rwc", dir.path().display()))
                .await
                .unwrap(),
        );
        let blob_store = Arc::new(LocalBlobStore::new(dir.path().join("blobs")));
        let dyn_blob_store: Arc<dyn BlobStore> = blob_store.clone();
        let assembler = Arc::new(ChunkAssembler::new(dir.path(), job_store.clone()));
        let publisher = Arc::new(ArtifactPublisher::new(job_store.clone(), blob_store, None));

        let registry = Arc::new(StageRegistry::new(vec![
            Arc::new(MetadataExtractionWorker::new(dyn_blob_store.clone())),
            Arc::new(PrnuWorker::new(dyn_blob_store.clone())),
            Arc::new(FftWorker::new(dyn_blob_store.clone())),
            Arc::new(ClassificationWorker::default()),
            Arc::new(CleaningWorker::new(dyn_blob_store.clone(), None)),
        ]));
        let recorder = Arc::new(RecordingSender {
            events: TokioMutex::new(Vec::new()),
        });
        let sender: Arc<dyn forensic_pipeline_domain::services::WebhookSender> = recorder.clone();
        let webhooks = Arc::new(WebhookDispatcher::new(sender, 3));
        let executor = Arc::new(Executor::new(
            job_store.clone(),
            dyn_blob_store,
            registry,
            publisher.clone(),
            webhooks.clone(),
        ));
        let scheduler = Arc::new(Scheduler::new(executor, job_store.clone(), 2));
        let use_case = CompleteUpload::new(assembler.clone(), publisher, scheduler, webhooks);

        let upload = assembler
            .init("evidence.mp4", 5, "video/mp4", 10_000, 5, &["mp4"], &["video/mp4"])
            .await
            .unwrap();
        assembler.put_chunk(upload.id, 0, b"hello").await.unwrap();

        use_case.execute(upload.id, Some("https://example.test/hook".to_string())).await.unwrap();
        tokio::time::sleep(Duration::from_millis(200)).await;

        let events = recorder.events.lock().await;
        assert_eq!(events.first(), Some(&WebhookEventKind::UploadCompleted));
        assert!(events.iter().any(|e| *e == WebhookEventKind::Started));
    }
}
