// /////////////////////////////////////////////////////////////////////////////
// Forensic Video Pipeline
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! Domain error taxonomy for the forensic pipeline.
//!
//! The variants mirror the error categories of the orchestration subsystem:
//! validation failures at the boundary, missing entities, state-precondition
//! conflicts, transient infrastructure failures, stage-worker failures, and
//! unexpected internal invariant violations. Each category maps to a single
//! HTTP status family at the presentation layer (not implemented here), so
//! the variant a caller matches on tells it how to react without needing to
//! inspect the message string.

use thiserror::Error;

/// Errors that can occur within the pipeline orchestration domain.
#[derive(Error, Debug, Clone)]
pub enum ForensicError {
    /// Ill-formed input at a boundary: bad filename extension, oversize
    /// upload, malformed id, bad chunk index. Never enters the pipeline.
    #[error("validation error: {0}")]
    Validation(String),

    /// A referenced entity (job, stage, file, upload) does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// A state precondition was violated, e.g. `reprocess` on a `Running`
    /// job.
    #[error("conflict: {0}")]
    Conflict(String),

    /// A transient storage or network failure. Retried within the owning
    /// component (webhook dispatcher, CDN mirror); never propagated into a
    /// job's state unless it is the stage's primary work.
    #[error("transient failure: {0}")]
    Transient(String),

    /// A stage worker returned an error; the owning job transitions to
    /// `Failed`.
    #[error("stage failed: {0}")]
    StageFailure(String),

    /// An invariant was violated that should be structurally impossible,
    /// e.g. the job store can't find a job it just committed.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ForensicError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn transient(msg: impl Into<String>) -> Self {
        Self::Transient(msg.into())
    }

    pub fn stage_failure(msg: impl Into<String>) -> Self {
        Self::StageFailure(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// True for failures that are safe to retry without additional
    /// intervention.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ForensicError::Transient(_))
    }

    /// Stable category tag, useful for metrics and log fields.
    pub fn category(&self) -> &'static str {
        match self {
            ForensicError::Validation(_) => "validation",
            ForensicError::NotFound(_) => "not_found",
            ForensicError::Conflict(_) => "conflict",
            ForensicError::Transient(_) => "transient",
            ForensicError::StageFailure(_) => "stage_failure",
            ForensicError::Internal(_) => "internal",
        }
    }
}

impl From<std::io::Error> for ForensicError {
    fn from(err: std::io::Error) -> Self {
        ForensicError::Transient(err.to_string())
    }
}

impl From<serde_json::Error> for ForensicError {
    fn from(err: serde_json::Error) -> Self {
        ForensicError::Internal(format!("serialization error: {err}"))
    }
}
