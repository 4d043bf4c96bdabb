// /////////////////////////////////////////////////////////////////////////////
// Forensic Video Pipeline
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! Builds the forensic report JSON (spec §6.2) from a job's completed
//! stage results, by direct `serde_json::Value` construction rather than
//! a typed struct, so "not available" means a missing/null key rather
//! than a library-specific `Option::None` sentinel serialization.

use forensic_pipeline_domain::entities::{Job, Stage};
use forensic_pipeline_domain::services::analyzer_results::{
    ClassificationResult, FftResult, MetadataResult, PrnuResult,
};
use forensic_pipeline_domain::value_objects::StageName;
use serde_json::{json, Value};

fn confidence_level(confidence: f64) -> &'static str {
    if confidence >= 0.75 {
        "alta"
    } else if confidence >= 0.4 {
        "média"
    } else {
        "baixa"
    }
}

fn stage_result<T: serde::de::DeserializeOwned>(stages: &[Stage], name: StageName) -> Option<T> {
    stages
        .iter()
        .find(|s| s.name == name)
        .and_then(|s| s.result.clone())
        .and_then(|v| serde_json::from_value(v).ok())
}

/// Assembles the exact top-level key set of spec §6.2 from a job and its
/// (by this point, all-`Completed`-or-downgraded) stages. Unavailable
/// values are emitted as JSON `null`.
pub fn build_report(job: &Job, stages: &[Stage]) -> Value {
    let metadata: Option<MetadataResult> = stage_result(stages, StageName::MetadataExtraction);
    let prnu: Option<PrnuResult> = stage_result(stages, StageName::Prnu);
    let fft: Option<FftResult> = stage_result(stages, StageName::Fft);
    let classification: Option<ClassificationResult> = stage_result(stages, StageName::Classification);

    let (classification_label, confidence, reason) = match &classification {
        Some(c) => (
            Value::String(c.label.clone()),
            c.confidence,
            Value::String(format!(
                "classifier {} produced {} with confidence {:.2}",
                c.model_version, c.label, c.confidence
            )),
        ),
        None => (Value::String("UNKNOWN".to_string()), 0.0, Value::Null),
    };

    let tool_signatures = match (&prnu, &fft) {
        (Some(p), Some(f)) => json!({
            "prnu_reference_device": p.reference_device,
            "fft_suspicious_frame_count": f.suspicious_frames.len(),
        }),
        _ => Value::Null,
    };

    let fingerprint = metadata.as_ref().map(|m| {
        json!({
            "container_format": m.container_format,
            "codec": m.codec,
        })
    });

    json!({
        "file": job.original_filename,
        "file_path": format!("/files/{}/original", job.id),
        "codec": metadata.as_ref().map(|m| m.codec.clone()),
        "encoder": Value::Null,
        "major_brand": metadata.as_ref().map(|m| m.container_format.clone()),
        "compatible_brands": Value::Array(vec![]),
        "duration": metadata.as_ref().map(|m| m.duration_seconds),
        "bit_rate": Value::Null,
        "frame_rate": metadata.as_ref().map(|m| m.frame_rate),
        "width": metadata.as_ref().map(|m| m.width),
        "height": metadata.as_ref().map(|m| m.height),
        "gop_estimate": Value::Null,
        "qp_pattern": Value::Null,
        "classification": classification_label,
        "confidence": confidence,
        "confidence_level": confidence_level(confidence),
        "reason": reason,
        "most_likely_model": classification.as_ref().map(|c| c.model_version.clone()),
        "model_probabilities": Value::Null,
        "prnu_analysis": prnu.as_ref().map(|p| json!({
            "correlation_score": p.correlation_score,
            "reference_device": p.reference_device,
            "frames_sampled": p.frames_sampled,
        })),
        "fft_analysis": fft.as_ref().map(|f| json!({
            "anomaly_score": f.anomaly_score,
            "suspicious_frames": f.suspicious_frames,
        })),
        "metadata_integrity": metadata.as_ref().map(|m| json!({
            "creation_time": m.creation_time,
        })),
        "timeline": Value::Array(vec![]),
        "hybrid_analysis": Value::Null,
        "timeline_summary": Value::Null,
        "tool_signatures": tool_signatures,
        "fingerprint": fingerprint,
    })
}
