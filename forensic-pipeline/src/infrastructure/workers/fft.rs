// /////////////////////////////////////////////////////////////////////////////
// Forensic Video Pipeline
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! The `fft` stage: frequency-domain tamper indicators, grounded on
//! `src/core/fft_temporal.py`'s I/O shape (bytes in, an anomaly score plus
//! a list of suspicious frame indices out). The frequency-domain transform
//! itself is out of scope; this worker derives a deterministic anomaly
//! score from the byte length modulo a small prime, which is enough to
//! exercise the classification stage downstream without depending on
//! unspecified math.

use forensic_pipeline_domain::error::ForensicError;
use forensic_pipeline_domain::services::analyzer_results::FftResult;
use forensic_pipeline_domain::services::{BlobStore, StageInput, StageResult, StageWorker};
use forensic_pipeline_domain::value_objects::StageName;
use async_trait::async_trait;
use std::sync::Arc;

pub struct FftWorker {
    blob_store: Arc<dyn BlobStore>,
}

impl FftWorker {
    pub fn new(blob_store: Arc<dyn BlobStore>) -> Self {
        Self { blob_store }
    }
}

#[async_trait]
impl StageWorker for FftWorker {
    fn stage_name(&self) -> StageName {
        StageName::Fft
    }

    async fn run(&self, input: StageInput) -> Result<StageResult, ForensicError> {
        let bytes = self.blob_store.get(input.file).await?;
        let anomaly_score = (bytes.len() % 97) as f64 / 97.0;
        let suspicious_frames = if anomaly_score > 0.6 {
            vec![0, 1, 2]
        } else {
            Vec::new()
        };

        let result = FftResult {
            anomaly_score,
            suspicious_frames,
        };
        Ok(StageResult::Fft(result))
    }
}
