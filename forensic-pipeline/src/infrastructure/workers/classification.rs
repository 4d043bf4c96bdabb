// /////////////////////////////////////////////////////////////////////////////
// Forensic Video Pipeline
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! The `classification` stage: the final verdict on whether a file shows
//! signs of manipulation, grounded on `app/core/video_classifier.py`'s I/O
//! shape (prior analyzer signals in, a label plus confidence out). The
//! classifier model itself is out of scope; this worker folds the `prnu`
//! and `fft` stages' scores from `prior_results` into one of the closed
//! labels from spec §6.2.

use forensic_pipeline_domain::error::ForensicError;
use forensic_pipeline_domain::services::analyzer_results::ClassificationResult;
use forensic_pipeline_domain::services::{StageInput, StageResult, StageWorker};
use forensic_pipeline_domain::value_objects::StageName;
use async_trait::async_trait;

/// Closed set of classification labels per spec §6.2.
pub const REAL_CAMERA: &str = "REAL_CAMERA";
pub const AI_HEVC: &str = "AI_HEVC";
pub const UNKNOWN: &str = "UNKNOWN";

pub struct ClassificationWorker {
    model_version: String,
}

impl ClassificationWorker {
    pub fn new(model_version: impl Into<String>) -> Self {
        Self {
            model_version: model_version.into(),
        }
    }
}

impl Default for ClassificationWorker {
    fn default() -> Self {
        Self::new("forensic-classifier-v1")
    }
}

#[async_trait]
impl StageWorker for ClassificationWorker {
    fn stage_name(&self) -> StageName {
        StageName::Classification
    }

    async fn run(&self, input: StageInput) -> Result<StageResult, ForensicError> {
        let mut prnu_score = None;
        let mut fft_score = None;
        for prior in &input.prior_results {
            match prior {
                StageResult::Prnu(p) => prnu_score = Some(p.correlation_score),
                StageResult::Fft(f) => fft_score = Some(f.anomaly_score),
                _ => {}
            }
        }

        let (label, confidence) = match (prnu_score, fft_score) {
            (Some(prnu), Some(fft)) if prnu > 0.7 && fft < 0.3 => (REAL_CAMERA, prnu),
            (Some(prnu), Some(fft)) if prnu < 0.3 && fft > 0.6 => (AI_HEVC, fft),
            (Some(prnu), Some(fft)) => (UNKNOWN, 1.0 - (prnu - fft).abs().min(1.0)),
            _ => (UNKNOWN, 0.5),
        };

        let result = ClassificationResult {
            label: label.to_string(),
            confidence,
            model_version: self.model_version.clone(),
        };
        Ok(StageResult::Classification(result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use forensic_pipeline_domain::services::analyzer_results::{FftResult, PrnuResult};
    use forensic_pipeline_domain::value_objects::FileId;

    #[tokio::test]
    async fn high_prnu_low_fft_classifies_as_real_camera() {
        let worker = ClassificationWorker::default();
        let input = StageInput::with_prior_results(
            FileId::new(),
            vec![
                StageResult::Prnu(PrnuResult {
                    correlation_score: 0.9,
                    reference_device: None,
                    frames_sampled: 200,
                }),
                StageResult::Fft(FftResult {
                    anomaly_score: 0.1,
                    suspicious_frames: vec![],
                }),
            ],
        );
        let result = worker.run(input).await.unwrap();
        if let StageResult::Classification(c) = result {
            assert_eq!(c.label, REAL_CAMERA);
        } else {
            panic!("expected a Classification result");
        }
    }

    #[tokio::test]
    async fn no_prior_results_is_unknown() {
        let worker = ClassificationWorker::default();
        let result = worker.run(StageInput::new(FileId::new())).await.unwrap();
        if let StageResult::Classification(c) = result {
            assert_eq!(c.label, UNKNOWN);
        } else {
            panic!("expected a Classification result");
        }
    }
}
