// /////////////////////////////////////////////////////////////////////////////
// Forensic Video Pipeline
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! The `WebhookSender` port and the event envelope delivered through it.

use crate::error::ForensicError;
use crate::value_objects::{datetime_serde, JobId, StageName};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What happened, named the way a webhook consumer would expect to match
/// on it. The wire names are the dotted event strings a subscriber
/// matches against, not Rust-cased variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WebhookEventKind {
    #[serde(rename = "analysis.upload.completed")]
    UploadCompleted,
    #[serde(rename = "analysis.started")]
    Started,
    #[serde(rename = "analysis.step.started")]
    StepStarted,
    #[serde(rename = "analysis.step.completed")]
    StepCompleted,
    #[serde(rename = "analysis.completed")]
    Completed,
    #[serde(rename = "analysis.failed")]
    Failed,
}

/// The envelope posted to a job's configured webhook URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookEnvelope {
    pub event: WebhookEventKind,
    pub analysis_id: JobId,
    #[serde(with = "datetime_serde")]
    pub timestamp: DateTime<Utc>,
    /// `Some` for `stage_completed`, naming which stage finished.
    pub stage: Option<StageName>,
    pub data: serde_json::Value,
}

impl WebhookEnvelope {
    pub fn new(
        event: WebhookEventKind,
        analysis_id: JobId,
        timestamp: DateTime<Utc>,
        stage: Option<StageName>,
        data: serde_json::Value,
    ) -> Self {
        Self {
            event,
            analysis_id,
            timestamp,
            stage,
            data,
        }
    }
}

/// Delivers one webhook envelope. Implementations are expected to retry
/// transient failures internally (see the infrastructure dispatcher) but
/// this port's contract is simple: try once, report the outcome.
#[async_trait]
pub trait WebhookSender: Send + Sync {
    async fn send(&self, url: &str, envelope: &WebhookEnvelope) -> Result<(), ForensicError>;
}
