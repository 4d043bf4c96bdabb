// /////////////////////////////////////////////////////////////////////////////
// Forensic Video Pipeline
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! `SubmitUpload`: opens a new chunked-upload session (spec §6.1
//! `POST /upload/init`).

use crate::config::PipelineConfig;
use crate::infrastructure::ChunkAssembler;
use forensic_pipeline_domain::entities::Upload;
use forensic_pipeline_domain::error::ForensicError;
use std::sync::Arc;

pub struct SubmitUpload {
    assembler: Arc<ChunkAssembler>,
    config: Arc<PipelineConfig>,
}

impl SubmitUpload {
    pub fn new(assembler: Arc<ChunkAssembler>, config: Arc<PipelineConfig>) -> Self {
        Self { assembler, config }
    }

    /// Validates `original_filename`/`media_type`/`total_size_bytes`
    /// against the configured limits and the closed set of accepted
    /// video formats, then opens the session.
    pub async fn execute(
        &self,
        original_filename: String,
        total_size_bytes: u64,
        media_type: String,
    ) -> Result<Upload, ForensicError> {
        self.assembler
            .init(
                original_filename,
                total_size_bytes,
                &media_type,
                self.config.max_file_size,
                self.config.chunk_size,
                PipelineConfig::allowed_extensions(),
                PipelineConfig::allowed_media_types(),
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::repositories::SqliteJobStore;

    async fn new_submit_upload() -> (SubmitUpload, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(
            SqliteJobStore::connect(&format!("sqlite://{}/db.sqlite?mode=rwc", dir.path().display()))
                .await
                .unwrap(),
        );
        let assembler = Arc::new(ChunkAssembler::new(dir.path(), store));
        let config = Arc::new(PipelineConfig::default());
        (SubmitUpload::new(assembler, config), dir)
    }

    #[tokio::test]
    async fn accepts_a_valid_video_file() {
        let (use_case, _dir) = new_submit_upload().await;
        let upload = use_case
            .execute("evidence.mp4".to_string(), 1024, "video/mp4".to_string())
            .await
            .unwrap();
        assert_eq!(upload.total_size_bytes, 1024);
    }

    #[tokio::test]
    async fn rejects_a_disallowed_media_type() {
        let (use_case, _dir) = new_submit_upload().await;
        let err = use_case
            .execute("evidence.mp4".to_string(), 1024, "application/pdf".to_string())
            .await
            .unwrap_err();
        assert_eq!(err.category(), "validation");
    }

    #[tokio::test]
    async fn rejects_an_oversized_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(
            SqliteJobStore::connect(&format!("sqlite://{}/db.sqlite?mode=rwc", dir.path().display()))
                .await
                .unwrap(),
        );
        let assembler = Arc::new(ChunkAssembler::new(dir.path(), store));
        let config = Arc::new(PipelineConfig {
            max_file_size: 100,
            ..PipelineConfig::default()
        });
        let use_case = SubmitUpload::new(assembler, config);

        let err = use_case
            .execute("evidence.mp4".to_string(), 1024, "video/mp4".to_string())
            .await
            .unwrap_err();
        assert_eq!(err.category(), "validation");
    }
}
