// /////////////////////////////////////////////////////////////////////////////
// Forensic Video Pipeline
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! The artifact publisher (C9): the single choke point by which a
//! stage's produced bytes become a durable, job-attached `FileRecord`.
//!
//! `publish` is the only place that writes a `FileRecord` after job
//! creation and the only place that flips a job's `report_file_id` or
//! `clean_video_id` slot, so every caller (the executor's stage loop,
//! the virtual `report_generation` step) goes through it rather than
//! writing C1/C3 directly.

use forensic_pipeline_domain::entities::{FileRecord, Job, Stage};
use forensic_pipeline_domain::error::ForensicError;
use forensic_pipeline_domain::repositories::JobStore;
use forensic_pipeline_domain::services::{BlobMirror, BlobStore};
use forensic_pipeline_domain::value_objects::{FileId, JobId};
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};

use crate::infrastructure::blob_store::LocalBlobStore;

/// Which job slot a published artifact fills. `Original` is published
/// atomically with job creation via [`ArtifactPublisher::publish_original_for_new_job`];
/// `Report` and `CleanVideo` go through [`ArtifactPublisher::publish`] once
/// the job already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Original,
    Report,
    CleanVideo,
}

impl ArtifactKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactKind::Original => "original",
            ArtifactKind::Report => "report",
            ArtifactKind::CleanVideo => "clean_video",
        }
    }
}

pub struct ArtifactPublisher {
    job_store: Arc<dyn JobStore>,
    blob_store: Arc<LocalBlobStore>,
    mirror: Option<Arc<dyn BlobMirror>>,
}

impl ArtifactPublisher {
    pub fn new(
        job_store: Arc<dyn JobStore>,
        blob_store: Arc<LocalBlobStore>,
        mirror: Option<Arc<dyn BlobMirror>>,
    ) -> Self {
        Self {
            job_store,
            blob_store,
            mirror,
        }
    }

    /// Publishes `bytes` as a new artifact of `kind` for `job_id`, per
    /// spec §4.9's three-step operation. Remote mirroring is
    /// best-effort and runs after the local transaction commits; its
    /// failure is logged, never returned.
    pub async fn publish(
        &self,
        job_id: JobId,
        kind: ArtifactKind,
        bytes: Vec<u8>,
        declared_filename: impl Into<String>,
        media_type: Option<String>,
    ) -> Result<FileId, ForensicError> {
        let declared_filename = declared_filename.into();
        let file_id = FileId::new();

        let (location, sha256) = self.blob_store.put_with_digest(file_id, &bytes).await?;

        let file = FileRecord::new(
            file_id,
            declared_filename,
            media_type,
            bytes.len() as u64,
            sha256,
            location,
            Utc::now(),
        );
        self.job_store.save_file(file.clone()).await?;

        let mut job = self.job_store.get_job(job_id).await?;
        match kind {
            ArtifactKind::Original => job.source_file = file_id,
            ArtifactKind::Report => job.set_report_file(file_id),
            ArtifactKind::CleanVideo => job.set_clean_video(file_id),
        }
        self.job_store.update_job(job).await?;

        info!(job_id = %job_id, file_id = %file_id, kind = ?kind, "artifact published");
        self.spawn_mirror(job_id, file_id, bytes);

        Ok(file_id)
    }

    /// Publishes `bytes` as the job's `original` artifact at creation time
    /// (spec §4.3): the `FileRecord`, the `Job`, and its stage rows are
    /// written in one transaction, so a crash partway through can never
    /// leave a job whose `source_file` points at a record that was never
    /// written.
    pub async fn publish_original_for_new_job(
        &self,
        file_id: FileId,
        job: Job,
        stages: Vec<Stage>,
        bytes: Vec<u8>,
        declared_filename: impl Into<String>,
    ) -> Result<(), ForensicError> {
        let declared_filename = declared_filename.into();
        let job_id = job.id;

        let (location, sha256) = self.blob_store.put_with_digest(file_id, &bytes).await?;
        let file = FileRecord::new(file_id, declared_filename, None, bytes.len() as u64, sha256, location, Utc::now());

        self.job_store.create_job_with_file(file, job, stages).await?;

        info!(job_id = %job_id, file_id = %file_id, "original artifact published with new job");
        self.spawn_mirror(job_id, file_id, bytes);

        Ok(())
    }

    /// Best-effort remote mirror upload, run after the local write
    /// commits. Failure is logged, never returned.
    fn spawn_mirror(&self, job_id: JobId, file_id: FileId, bytes: Vec<u8>) {
        let Some(mirror) = self.mirror.clone() else {
            return;
        };
        let job_store = self.job_store.clone();
        tokio::spawn(async move {
            match mirror.mirror(file_id, &bytes).await {
                Ok(remote_location) => {
                    if let Ok(mut file) = job_store.get_file(file_id).await {
                        file.mark_mirrored(remote_location);
                        let _ = job_store.update_file(file).await;
                    }
                }
                Err(e) => {
                    warn!(job_id = %job_id, file_id = %file_id, error = ?e, "remote mirror upload failed, leaving cdn_uploaded=false");
                }
            }
        });
    }
}
