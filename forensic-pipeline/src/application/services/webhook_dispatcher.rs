// /////////////////////////////////////////////////////////////////////////////
// Forensic Video Pipeline
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! The webhook dispatcher (C5): at-least-once, per-job-ordered delivery
//! of event envelopes.
//!
//! Per spec §9's first alternative, ordering is implemented with a
//! bounded `tokio::mpsc` channel per job, drained by one dedicated
//! sender task — this keeps a single job's events strictly ordered
//! without serializing unrelated jobs against each other. The retry
//! loop (exponential backoff, `2^k` seconds) lives here, one layer
//! above the single-attempt `WebhookSender` port.

use forensic_pipeline_domain::error::ForensicError;
use forensic_pipeline_domain::services::{WebhookEnvelope, WebhookSender};
use forensic_pipeline_domain::value_objects::JobId;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tracing::{error, warn};

const CHANNEL_CAPACITY: usize = 64;

struct JobChannel {
    sender: mpsc::Sender<(String, WebhookEnvelope)>,
}

/// Fans out webhook envelopes, one ordered queue per job.
///
/// Jobs with no `webhook_url` never get a channel; `dispatch` is a no-op
/// for them, so callers can always call it unconditionally.
pub struct WebhookDispatcher {
    sender: Arc<dyn WebhookSender>,
    max_attempts: u32,
    channels: Mutex<HashMap<JobId, JobChannel>>,
}

impl WebhookDispatcher {
    pub fn new(sender: Arc<dyn WebhookSender>, max_attempts: u32) -> Self {
        Self {
            sender,
            max_attempts,
            channels: Mutex::new(HashMap::new()),
        }
    }

    /// Enqueues `envelope` for delivery to `url`, creating the job's
    /// sender task on first use. Returns once the envelope is queued,
    /// not once it is delivered — callers do not block on network I/O.
    pub async fn dispatch(&self, url: &str, envelope: WebhookEnvelope) {
        let job_id = envelope.analysis_id;
        let mut channels = self.channels.lock().await;
        let channel = channels.entry(job_id).or_insert_with(|| {
            let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
            spawn_sender_task(self.sender.clone(), self.max_attempts, rx);
            JobChannel { sender: tx }
        });

        if channel.sender.send((url.to_string(), envelope)).await.is_err() {
            error!(job_id = %job_id, "webhook sender task for job is gone, dropping envelope");
        }
    }
}

fn spawn_sender_task(
    sender: Arc<dyn WebhookSender>,
    max_attempts: u32,
    mut rx: mpsc::Receiver<(String, WebhookEnvelope)>,
) {
    tokio::spawn(async move {
        while let Some((url, envelope)) = rx.recv().await {
            deliver_with_retry(sender.as_ref(), &url, &envelope, max_attempts).await;
        }
    });
}

/// Attempts delivery up to `max_attempts` times with `2^k` second
/// backoff between attempts (k starting at 0). Exhausting retries is
/// logged and never propagated: webhook failures must not fail a job.
async fn deliver_with_retry(
    sender: &dyn WebhookSender,
    url: &str,
    envelope: &WebhookEnvelope,
    max_attempts: u32,
) {
    let mut last_err: Option<ForensicError> = None;
    for attempt in 0..max_attempts {
        match sender.send(url, envelope).await {
            Ok(()) => return,
            Err(e) => {
                warn!(
                    url,
                    attempt,
                    event = ?envelope.event,
                    job_id = %envelope.analysis_id,
                    error = ?e,
                    "webhook delivery attempt failed"
                );
                last_err = Some(e);
                if attempt + 1 < max_attempts {
                    tokio::time::sleep(Duration::from_secs(2u64.pow(attempt))).await;
                }
            }
        }
    }
    error!(
        url,
        event = ?envelope.event,
        job_id = %envelope.analysis_id,
        error = ?last_err,
        "webhook delivery exhausted retries, giving up"
    );
}
