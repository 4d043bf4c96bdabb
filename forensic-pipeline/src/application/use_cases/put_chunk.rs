// /////////////////////////////////////////////////////////////////////////////
// Forensic Video Pipeline
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! `PutChunk`: writes one chunk of an in-progress upload (spec §6.1
//! `POST /upload/chunk/{upload_id}`).

use crate::infrastructure::ChunkAssembler;
use forensic_pipeline_domain::entities::Upload;
use forensic_pipeline_domain::error::ForensicError;
use forensic_pipeline_domain::value_objects::UploadId;
use std::sync::Arc;

pub struct PutChunk {
    assembler: Arc<ChunkAssembler>,
}

impl PutChunk {
    pub fn new(assembler: Arc<ChunkAssembler>) -> Self {
        Self { assembler }
    }

    pub async fn execute(&self, upload_id: UploadId, index: u32, bytes: Vec<u8>) -> Result<Upload, ForensicError> {
        self.assembler.put_chunk(upload_id, index, &bytes).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::repositories::SqliteJobStore;

    #[tokio::test]
    async fn writes_a_chunk_and_reports_progress() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(
            SqliteJobStore::connect(&format!("sqlite://{}/db.sqlite?mode=rwc", dir.path().display()))
                .await
                .unwrap(),
        );
        let assembler = Arc::new(ChunkAssembler::new(dir.path(), store));
        let upload = assembler
            .init("evidence.mp4", 10, "video/mp4", 10_000, 5, &["mp4"], &["video/mp4"])
            .await
            .unwrap();

        let use_case = PutChunk::new(assembler);
        let updated = use_case.execute(upload.id, 0, b"right".to_vec()).await.unwrap();
        assert_eq!(updated.chunks_received(), 1);
    }

    #[tokio::test]
    async fn rejects_an_out_of_range_index() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(
            SqliteJobStore::connect(&format!("sqlite://{}/db.sqlite?mode=rwc", dir.path().display()))
                .await
                .unwrap(),
        );
        let assembler = Arc::new(ChunkAssembler::new(dir.path(), store));
        let upload = assembler
            .init("evidence.mp4", 10, "video/mp4", 10_000, 5, &["mp4"], &["video/mp4"])
            .await
            .unwrap();

        let use_case = PutChunk::new(assembler);
        let err = use_case
            .execute(upload.id, upload.total_chunks, b"x".to_vec())
            .await
            .unwrap_err();
        assert_eq!(err.category(), "validation");
    }
}
