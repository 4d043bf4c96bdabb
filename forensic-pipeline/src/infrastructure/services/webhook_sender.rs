// /////////////////////////////////////////////////////////////////////////////
// Forensic Video Pipeline
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! `HttpWebhookSender`: the `reqwest`-based transport behind the
//! `WebhookSender` port.
//!
//! This adapter tries exactly once, as the port's contract promises; the
//! retry/backoff loop of spec §4.5 lives one layer up, in the
//! application-layer dispatcher, which is what actually owns "attempt
//! N of default 3".

use forensic_pipeline_domain::error::ForensicError;
use forensic_pipeline_domain::services::{WebhookEnvelope, WebhookSender};
use async_trait::async_trait;
use std::time::Duration;

pub struct HttpWebhookSender {
    client: reqwest::Client,
}

impl HttpWebhookSender {
    pub fn new(timeout: Duration) -> Result<Self, ForensicError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ForensicError::internal(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl WebhookSender for HttpWebhookSender {
    async fn send(&self, url: &str, envelope: &WebhookEnvelope) -> Result<(), ForensicError> {
        let response = self
            .client
            .post(url)
            .json(envelope)
            .send()
            .await
            .map_err(|e| ForensicError::transient(format!("webhook request failed: {e}")))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(ForensicError::transient(format!(
                "webhook endpoint returned status {}",
                response.status()
            )))
        }
    }
}
