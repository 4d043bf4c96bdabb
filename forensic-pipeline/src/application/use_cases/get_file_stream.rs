// /////////////////////////////////////////////////////////////////////////////
// Forensic Video Pipeline
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! `GetFileStream`: streams the bytes of an attached artifact back out
//! (spec §6.3 `GET /files/{id}/{kind}`).

use crate::application::services::ArtifactKind;
use forensic_pipeline_domain::entities::FileRecord;
use forensic_pipeline_domain::error::ForensicError;
use forensic_pipeline_domain::repositories::JobStore;
use forensic_pipeline_domain::services::BlobStore;
use forensic_pipeline_domain::value_objects::JobId;
use std::sync::Arc;

pub struct FileStream {
    pub file: FileRecord,
    pub bytes: Vec<u8>,
}

pub struct GetFileStream {
    job_store: Arc<dyn JobStore>,
    blob_store: Arc<dyn BlobStore>,
}

impl GetFileStream {
    pub fn new(job_store: Arc<dyn JobStore>, blob_store: Arc<dyn BlobStore>) -> Self {
        Self { job_store, blob_store }
    }

    /// Resolves `job_id`'s `kind` slot to a `FileRecord` and reads its
    /// bytes. `NotFound` if the job has no artifact of that kind yet
    /// (e.g. a `report` requested before `report_generation` ran).
    pub async fn execute(&self, job_id: JobId, kind: ArtifactKind) -> Result<FileStream, ForensicError> {
        let job = self.job_store.get_job(job_id).await?;
        let file_id = match kind {
            ArtifactKind::Original => Some(job.source_file),
            ArtifactKind::Report => job.report_file_id,
            ArtifactKind::CleanVideo => job.clean_video_id,
        }
        .ok_or_else(|| ForensicError::not_found(format!("job {job_id} has no {} artifact", kind.as_str())))?;

        let file = self.job_store.get_file(file_id).await?;
        let bytes = self.blob_store.get(file_id).await?;
        Ok(FileStream { file, bytes })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::ArtifactPublisher;
    use crate::infrastructure::{repositories::SqliteJobStore, LocalBlobStore};
    use chrono::Utc;
    use forensic_pipeline_domain::entities::{Job, Stage};
    use forensic_pipeline_domain::value_objects::{FileId, StageName};

    async fn seed_job(store: &SqliteJobStore, publisher: &ArtifactPublisher) -> JobId {
        let job = Job::new(JobId::new(), FileId::new(), "evidence.mp4", None, Utc::now());
        let job_id = job.id;
        let stages = StageName::ORDER.iter().map(|&n| Stage::pending(job_id, n, job.attempt)).collect();
        store.create_job(job, stages).await.unwrap();
        publisher
            .publish(job_id, ArtifactKind::Original, b"bytes".to_vec(), "evidence.mp4", None)
            .await
            .unwrap();
        job_id
    }

    #[tokio::test]
    async fn streams_the_original_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(
            SqliteJobStore::connect(&format!("sqlite://{}/db.sqlite?mode=rwc", dir.path().display()))
                .await
                .unwrap(),
        );
        let blob_store = Arc::new(LocalBlobStore::new(dir.path().join("blobs")));
        let publisher = ArtifactPublisher::new(store.clone(), blob_store.clone(), None);
        let job_id = seed_job(&store, &publisher).await;

        let use_case = GetFileStream::new(store, blob_store);
        let stream = use_case.execute(job_id, ArtifactKind::Original).await.unwrap();
        assert_eq!(stream.bytes, b"bytes");
    }

    #[tokio::test]
    async fn report_not_yet_published_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(
            SqliteJobStore::connect(&format!("sqlite://{}/db.sqlite?mode=rwc", dir.path().display()))
                .await
                .unwrap(),
        );
        let blob_store = Arc::new(LocalBlobStore::new(dir.path().join("blobs")));
        let publisher = ArtifactPublisher::new(store.clone(), blob_store.clone(), None);
        let job_id = seed_job(&store, &publisher).await;

        let use_case = GetFileStream::new(store, blob_store);
        let err = use_case.execute(job_id, ArtifactKind::Report).await.unwrap_err();
        assert_eq!(err.category(), "not_found");
    }
}
