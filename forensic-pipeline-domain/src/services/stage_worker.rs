// /////////////////////////////////////////////////////////////////////////////
// Forensic Video Pipeline
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! The `StageWorker` port: the executor's view of one analysis stage.
//!
//! Infrastructure provides one implementation per [`StageName`]; the
//! executor is generic over the trait and never matches on which stage it
//! is running.

use crate::error::ForensicError;
use crate::services::analyzer_results::{
    ClassificationResult, CleaningResult, FftResult, MetadataResult, PrnuResult,
};
use crate::value_objects::{FileId, StageName};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// The closed set of stage outcomes. Tagged by stage name so a result can
/// be stored and later read back without losing which analyzer produced
/// it, and so the report builder can destructure it exhaustively.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "stage", rename_all = "snake_case")]
pub enum StageResult {
    MetadataExtraction(MetadataResult),
    Prnu(PrnuResult),
    Fft(FftResult),
    Classification(ClassificationResult),
    Cleaning(CleaningResult),
}

impl StageResult {
    pub fn stage_name(&self) -> StageName {
        match self {
            StageResult::MetadataExtraction(_) => StageName::MetadataExtraction,
            StageResult::Prnu(_) => StageName::Prnu,
            StageResult::Fft(_) => StageName::Fft,
            StageResult::Classification(_) => StageName::Classification,
            StageResult::Cleaning(_) => StageName::Cleaning,
        }
    }
}

/// Input handed to a stage worker: the source file plus any prior stage
/// results the stage depends on. All five current stages only need the
/// source file, but later stages receiving upstream results (e.g.
/// `classification` weighing `prnu` and `fft` scores) is an anticipated
/// extension, not implemented here.
#[derive(Debug, Clone)]
pub struct StageInput {
    pub file: FileId,
    pub prior_results: Vec<StageResult>,
}

impl StageInput {
    pub fn new(file: FileId) -> Self {
        Self {
            file,
            prior_results: Vec::new(),
        }
    }

    pub fn with_prior_results(file: FileId, prior_results: Vec<StageResult>) -> Self {
        Self { file, prior_results }
    }
}

/// A single analysis stage's runnable logic. Infrastructure owns the
/// implementations (codec probing, PRNU extraction, FFT, classifier
/// inference, cleaning); this port is what the executor depends on.
#[async_trait]
pub trait StageWorker: Send + Sync {
    fn stage_name(&self) -> StageName;

    async fn run(&self, input: StageInput) -> Result<StageResult, ForensicError>;
}
