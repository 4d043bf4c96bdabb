// /////////////////////////////////////////////////////////////////////////////
// Forensic Video Pipeline
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! The `prnu` stage: sensor photo-response non-uniformity correlation
//! against a reference device fingerprint, grounded on
//! `app/core/sensor_calibration.py` and `src/core/prnu_detector.py`'s I/O
//! shape (bytes in, a correlation score plus optional matched device out).
//! The sensor-noise extraction itself is out of scope; this worker derives
//! a deterministic score from the SHA-256 of the source bytes.

use forensic_pipeline_domain::error::ForensicError;
use forensic_pipeline_domain::services::analyzer_results::PrnuResult;
use forensic_pipeline_domain::services::{BlobStore, StageInput, StageResult, StageWorker};
use forensic_pipeline_domain::value_objects::StageName;
use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::sync::Arc;

pub struct PrnuWorker {
    blob_store: Arc<dyn BlobStore>,
}

impl PrnuWorker {
    pub fn new(blob_store: Arc<dyn BlobStore>) -> Self {
        Self { blob_store }
    }
}

#[async_trait]
impl StageWorker for PrnuWorker {
    fn stage_name(&self) -> StageName {
        StageName::Prnu
    }

    async fn run(&self, input: StageInput) -> Result<StageResult, ForensicError> {
        let bytes = self.blob_store.get(input.file).await?;
        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        let digest = hasher.finalize();

        // Fold the first four digest bytes into a score in [0, 1).
        let seed = u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]]);
        let correlation_score = (seed as f64) / (u32::MAX as f64);

        let result = PrnuResult {
            correlation_score,
            reference_device: (correlation_score > 0.7).then(|| "reference-cam-01".to_string()),
            frames_sampled: 200,
        };
        Ok(StageResult::Prnu(result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use forensic_pipeline_domain::entities::StorageLocation;
    use forensic_pipeline_domain::value_objects::FileId;

    struct FakeBlobStore(Vec<u8>);

    #[async_trait]
    impl BlobStore for FakeBlobStore {
        async fn put(&self, _id: FileId, _bytes: Vec<u8>) -> Result<StorageLocation, ForensicError> {
            Ok(StorageLocation::Local { path: "x".into() })
        }
        async fn get(&self, _id: FileId) -> Result<Vec<u8>, ForensicError> {
            Ok(self.0.clone())
        }
        async fn delete(&self, _id: FileId) -> Result<(), ForensicError> {
            Ok(())
        }
        async fn exists(&self, _id: FileId) -> Result<bool, ForensicError> {
            Ok(true)
        }
    }

    #[tokio::test]
    async fn correlation_score_is_in_unit_range() {
        let worker = PrnuWorker::new(Arc::new(FakeBlobStore(b"evidence".to_vec())));
        let result = worker.run(StageInput::new(FileId::new())).await.unwrap();
        if let StageResult::Prnu(prnu) = result {
            assert!((0.0..1.0).contains(&prnu.correlation_score));
        } else {
            panic!("expected a Prnu result");
        }
    }
}
