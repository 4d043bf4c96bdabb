// /////////////////////////////////////////////////////////////////////////////
// Forensic Video Pipeline
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! `AnalyzeSingleShot`: ingests a whole file in one call (spec §6.1
//! `POST /upload/analyze`), internally driven through the same
//! init/chunk/complete path the multi-request protocol uses.

use crate::application::services::{ArtifactPublisher, Scheduler, WebhookDispatcher};
use crate::application::use_cases::complete_upload::finalize_upload;
use crate::config::PipelineConfig;
use crate::infrastructure::ChunkAssembler;
use forensic_pipeline_domain::error::ForensicError;
use forensic_pipeline_domain::value_objects::JobId;
use std::sync::Arc;

pub struct AnalyzeSingleShot {
    assembler: Arc<ChunkAssembler>,
    publisher: Arc<ArtifactPublisher>,
    scheduler: Arc<Scheduler>,
    webhooks: Arc<WebhookDispatcher>,
    config: Arc<PipelineConfig>,
}

impl AnalyzeSingleShot {
    pub fn new(
        assembler: Arc<ChunkAssembler>,
        publisher: Arc<ArtifactPublisher>,
        scheduler: Arc<Scheduler>,
        webhooks: Arc<WebhookDispatcher>,
        config: Arc<PipelineConfig>,
    ) -> Self {
        Self {
            assembler,
            publisher,
            scheduler,
            webhooks,
            config,
        }
    }

    /// Validates and accepts `bytes` as a whole, already-assembled file:
    /// same validation as `SubmitUpload`, but init, every chunk, and
    /// complete happen inside this one call.
    pub async fn execute(
        &self,
        original_filename: String,
        media_type: String,
        bytes: Vec<u8>,
        webhook_url: Option<String>,
    ) -> Result<JobId, ForensicError> {
        let total_size_bytes = bytes.len() as u64;
        let upload = self
            .assembler
            .init(
                original_filename,
                total_size_bytes,
                &media_type,
                self.config.max_file_size,
                self.config.chunk_size,
                PipelineConfig::allowed_extensions(),
                PipelineConfig::allowed_media_types(),
            )
            .await?;

        let chunk_size = self.config.chunk_size.max(1) as usize;
        for (index, chunk) in bytes.chunks(chunk_size).enumerate() {
            self.assembler.put_chunk(upload.id, index as u32, chunk).await?;
        }

        let (assembled, _sha256, completed_upload) = self.assembler.complete(upload.id).await?;
        finalize_upload(
            &self.publisher,
            &self.scheduler,
            &self.webhooks,
            completed_upload.original_filename,
            assembled,
            webhook_url,
        )
        .await
    }
}
