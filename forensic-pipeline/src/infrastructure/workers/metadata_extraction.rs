// /////////////////////////////////////////////////////////////////////////////
// Forensic Video Pipeline
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! The `metadata_extraction` stage: container-level facts read straight
//! off the file, grounded on `app/core/ffprobe_reader.py`'s I/O shape
//! (container probe in, a flat struct of codec/duration/dimensions out).
//! A real build shells out to `ffprobe`; this worker derives deterministic
//! stand-in values from the file's byte length and extension so the same
//! input always re-runs to the same output, as the executor's
//! resumability contract requires.

use forensic_pipeline_domain::error::ForensicError;
use forensic_pipeline_domain::services::analyzer_results::MetadataResult;
use forensic_pipeline_domain::services::{StageInput, StageResult, StageWorker};
use forensic_pipeline_domain::services::BlobStore;
use forensic_pipeline_domain::value_objects::StageName;
use async_trait::async_trait;
use std::sync::Arc;

pub struct MetadataExtractionWorker {
    blob_store: Arc<dyn BlobStore>,
}

impl MetadataExtractionWorker {
    pub fn new(blob_store: Arc<dyn BlobStore>) -> Self {
        Self { blob_store }
    }
}

#[async_trait]
impl StageWorker for MetadataExtractionWorker {
    fn stage_name(&self) -> StageName {
        StageName::MetadataExtraction
    }

    async fn run(&self, input: StageInput) -> Result<StageResult, ForensicError> {
        let bytes = self.blob_store.get(input.file).await?;
        if bytes.is_empty() {
            return Err(ForensicError::stage_failure("source file is empty"));
        }

        // Deterministic stand-ins derived from the byte length, in lieu of
        // an actual container probe (out of scope per spec).
        let len = bytes.len() as u64;
        let duration_seconds = (len % 6000) as f64 / 10.0 + 1.0;
        let frame_rate = if len % 2 == 0 { 29.97 } else { 24.0 };
        let width = 1920;
        let height = 1080;

        let result = MetadataResult {
            container_format: "mp4".to_string(),
            duration_seconds,
            width,
            height,
            frame_rate,
            codec: "h264".to_string(),
            creation_time: None,
        };
        Ok(StageResult::MetadataExtraction(result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use forensic_pipeline_domain::value_objects::FileId;
    use std::sync::Mutex;

    struct FakeBlobStore(Mutex<Vec<u8>>);

    #[async_trait]
    impl BlobStore for FakeBlobStore {
        async fn put(&self, _id: FileId, bytes: Vec<u8>) -> Result<forensic_pipeline_domain::entities::StorageLocation, ForensicError> {
            *self.0.lock().unwrap() = bytes;
            Ok(forensic_pipeline_domain::entities::StorageLocation::Local { path: "x".into() })
        }
        async fn get(&self, _id: FileId) -> Result<Vec<u8>, ForensicError> {
            Ok(self.0.lock().unwrap().clone())
        }
        async fn delete(&self, _id: FileId) -> Result<(), ForensicError> {
            Ok(())
        }
        async fn exists(&self, _id: FileId) -> Result<bool, ForensicError> {
            Ok(true)
        }
    }

    #[tokio::test]
    async fn rejects_empty_source_file() {
        let store = Arc::new(FakeBlobStore(Mutex::new(vec![])));
        let worker = MetadataExtractionWorker::new(store);
        let err = worker.run(StageInput::new(FileId::new())).await.unwrap_err();
        assert_eq!(err.category(), "stage_failure");
    }

    #[tokio::test]
    async fn same_input_produces_same_output() {
        let store = Arc::new(FakeBlobStore(Mutex::new(vec![1, 2, 3, 4, 5])));
        let worker = MetadataExtractionWorker::new(store);
        let a = worker.run(StageInput::new(FileId::new())).await.unwrap();
        let b = worker.run(StageInput::new(FileId::new())).await.unwrap();
        assert_eq!(a, b);
    }
}
