// /////////////////////////////////////////////////////////////////////////////
// Forensic Video Pipeline
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! Per-stage analyzer output types.
//!
//! Each is a plain data struct, not a trait object: the set of stages is
//! closed, so a tagged union ([`StageResult`] in
//! [`crate::services::stage_worker`]) models it more directly than an
//! open-ended plugin interface would.

use serde::{Deserialize, Serialize};

/// Output of the `metadata_extraction` stage: container-level facts read
/// straight off the file, not derived by any heavier analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataResult {
    pub container_format: String,
    pub duration_seconds: f64,
    pub width: u32,
    pub height: u32,
    pub frame_rate: f64,
    pub codec: String,
    pub creation_time: Option<String>,
}

/// Output of the `prnu` stage: sensor-noise fingerprint comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrnuResult {
    pub correlation_score: f64,
    pub reference_device: Option<String>,
    pub frames_sampled: u32,
}

/// Output of the `fft` stage: frequency-domain tamper indicators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FftResult {
    pub anomaly_score: f64,
    pub suspicious_frames: Vec<u32>,
}

/// Output of the `classification` stage: the model's verdict on whether
/// the file shows signs of manipulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub label: String,
    pub confidence: f64,
    pub model_version: String,
}

/// Output of the `cleaning` stage: a sanitized copy with metadata and
/// steganographic payloads stripped.
///
/// `skipped` lets this stage downgrade rather than fail (spec §4.4,
/// §7 StageFailure): when the external re-encoder binary is unavailable,
/// the worker reports `skipped = true` with a `skip_reason` instead of
/// returning an error, and the stage still completes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleaningResult {
    pub cleaned_file_size_bytes: u64,
    pub removed_metadata_fields: Vec<String>,
    pub skipped: bool,
    pub skip_reason: Option<String>,
}
