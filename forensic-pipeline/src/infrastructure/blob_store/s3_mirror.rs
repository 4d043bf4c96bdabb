// /////////////////////////////////////////////////////////////////////////////
// Forensic Video Pipeline
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! Optional best-effort mirror to an S3-compatible bucket. A mirror
//! failure is caught by the caller and must never fail a job; this
//! adapter only returns errors for `&self` to log, never to block on.

use crate::config::PipelineConfig;
use aws_sdk_s3::config::{Credentials, Region};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use forensic_pipeline_domain::entities::StorageLocation;
use forensic_pipeline_domain::error::ForensicError;
use forensic_pipeline_domain::services::BlobMirror;
use forensic_pipeline_domain::value_objects::FileId;
use async_trait::async_trait;

pub struct S3Mirror {
    client: Client,
    bucket: String,
    key_prefix: String,
    multipart_threshold: u64,
}

impl S3Mirror {
    /// Builds a client from the pipeline configuration. Returns `None`
    /// when remote mirroring is disabled or under-configured, so callers
    /// can fall back to local-only storage without a hard error.
    pub async fn from_config(config: &PipelineConfig) -> Option<Self> {
        if !config.remote_storage_enabled {
            return None;
        }
        let bucket = config.remote_bucket.clone()?;
        let region = config.remote_region.clone().unwrap_or_else(|| "us-east-1".to_string());

        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(Region::new(region));
        if let (Some(key), Some(secret)) = (&config.remote_key, &config.remote_secret) {
            loader = loader.credentials_provider(Credentials::new(
                key.clone(),
                secret.clone(),
                None,
                None,
                "forensic-pipeline-config",
            ));
        }
        let sdk_config = loader.load().await;

        let mut s3_builder = aws_sdk_s3::config::Builder::from(&sdk_config);
        if let Some(endpoint) = &config.remote_endpoint {
            s3_builder = s3_builder.endpoint_url(endpoint).force_path_style(true);
        }

        Some(Self {
            client: Client::from_conf(s3_builder.build()),
            bucket,
            key_prefix: config.remote_key_prefix.clone().unwrap_or_default(),
            multipart_threshold: config.remote_multipart_threshold,
        })
    }

    fn object_key(&self, id: FileId) -> String {
        if self.key_prefix.is_empty() {
            id.to_string()
        } else {
            format!("{}/{}", self.key_prefix.trim_end_matches('/'), id)
        }
    }
}

#[async_trait]
impl BlobMirror for S3Mirror {
    /// Uploads `bytes` to the bucket. Large objects above
    /// `multipart_threshold` are expected to be chunked by a dedicated
    /// multipart path in a production build; this mirror covers
    /// single-PUT objects, which suffices for reports and clean videos
    /// of the sizes this service produces.
    async fn mirror(&self, id: FileId, bytes: &[u8]) -> Result<StorageLocation, ForensicError> {
        let key = self.object_key(id);
        if bytes.len() as u64 > self.multipart_threshold {
            tracing::warn!(
                file_id = %id,
                size_bytes = bytes.len(),
                threshold = self.multipart_threshold,
                "object exceeds multipart threshold, uploading via single PUT"
            );
        }
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(ByteStream::from(bytes.to_vec()))
            .send()
            .await
            .map_err(|e| ForensicError::transient(format!("S3 upload failed: {e}")))?;

        Ok(StorageLocation::Remote {
            bucket: self.bucket.clone(),
            key,
        })
    }
}
