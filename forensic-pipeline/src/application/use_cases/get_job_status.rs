// /////////////////////////////////////////////////////////////////////////////
// Forensic Video Pipeline
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! `GetJobStatus`: the job plus its flattened stage list, aggregate
//! progress, and attached-artifact URLs (spec §6.3 `GET /analysis/{id}`).

use crate::application::services::{progress_aggregator, ArtifactKind, ProgressSnapshot};
use forensic_pipeline_domain::entities::{FileRecord, Job, Stage, StorageLocation};
use forensic_pipeline_domain::error::ForensicError;
use forensic_pipeline_domain::repositories::JobStore;
use forensic_pipeline_domain::value_objects::JobId;
use std::sync::Arc;

/// One attached artifact's kind and the URL a client should fetch it
/// from: the mirror's URL if it has been uploaded there, otherwise a
/// server-relative path a presentation layer would serve via
/// [`super::get_file_stream::GetFileStream`].
#[derive(Debug, Clone)]
pub struct ArtifactLink {
    pub kind: &'static str,
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct JobStatusView {
    pub job: Job,
    pub stages: Vec<Stage>,
    pub progress: ProgressSnapshot,
    pub artifacts: Vec<ArtifactLink>,
}

pub struct GetJobStatus {
    job_store: Arc<dyn JobStore>,
}

impl GetJobStatus {
    pub fn new(job_store: Arc<dyn JobStore>) -> Self {
        Self { job_store }
    }

    pub async fn execute(&self, job_id: JobId) -> Result<JobStatusView, ForensicError> {
        let job = self.job_store.get_job(job_id).await?;
        let stages = self.job_store.list_stages(job_id).await?;
        let progress = progress_aggregator::compute(&stages);

        let mut artifacts = Vec::new();
        for (kind, file_id) in [
            (ArtifactKind::Original, Some(job.source_file)),
            (ArtifactKind::Report, job.report_file_id),
            (ArtifactKind::CleanVideo, job.clean_video_id),
        ] {
            if let Some(file_id) = file_id {
                let file = self.job_store.get_file(file_id).await?;
                artifacts.push(ArtifactLink {
                    kind: kind.as_str(),
                    url: artifact_url(job_id, kind, &file),
                });
            }
        }

        Ok(JobStatusView {
            job,
            stages,
            progress,
            artifacts,
        })
    }
}

fn artifact_url(job_id: JobId, kind: ArtifactKind, file: &FileRecord) -> String {
    match &file.mirrored_location {
        Some(StorageLocation::Remote { bucket, key }) => format!("https://{bucket}/{key}"),
        _ => format!("/files/{job_id}/{}", kind.as_str()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::repositories::SqliteJobStore;
    use chrono::Utc;
    use forensic_pipeline_domain::entities::{FileRecord, Job, Stage};
    use forensic_pipeline_domain::value_objects::{FileId, StageName};

    async fn new_get_job_status() -> (GetJobStatus, Arc<SqliteJobStore>, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(
            SqliteJobStore::connect(&format!("sqlite://{}/db.sqlite?mode=rwc", dir.path().display()))
                .await
                .unwrap(),
        );
        (GetJobStatus::new(store.clone()), store, dir)
    }

    #[tokio::test]
    async fn reports_artifact_links_only_for_present_slots() {
        let (use_case, store, _dir) = new_get_job_status().await;
        let file_id = FileId::new();
        let record = FileRecord::new(
            file_id,
            "evidence.mp4",
            Some("video/mp4".to_string()),
            10,
            "deadbeef",
            forensic_pipeline_domain::entities::StorageLocation::Local {
                path: "/tmp/evidence.mp4".to_string(),
            },
            Utc::now(),
        );
        store.save_file(record).await.unwrap();

        let job = Job::new(JobId::new(), file_id, "evidence.mp4", None, Utc::now());
        let job_id = job.id;
        let stages = StageName::ORDER.iter().map(|&n| Stage::pending(job_id, n, job.attempt)).collect();
        store.create_job(job, stages).await.unwrap();

        let view = use_case.execute(job_id).await.unwrap();
        assert_eq!(view.artifacts.len(), 1);
        assert_eq!(view.artifacts[0].kind, "original");
        assert_eq!(view.progress.pending_count, 5);
    }

    #[tokio::test]
    async fn unknown_job_is_not_found() {
        let (use_case, _store, _dir) = new_get_job_status().await;
        let err = use_case.execute(JobId::new()).await.unwrap_err();
        assert_eq!(err.category(), "not_found");
    }
}
