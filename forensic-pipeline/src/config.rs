// /////////////////////////////////////////////////////////////////////////////
// Forensic Video Pipeline
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! Pipeline configuration: the options enumerated in spec §6.4, loaded
//! through the `config` crate over layered defaults and `FORENSIC_`
//! prefixed environment variables.

use forensic_pipeline_domain::ForensicError;
use serde::Deserialize;
use std::path::PathBuf;

/// All tunables of the orchestration subsystem. Immutable once built;
/// shared across tasks behind an `Arc`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Filesystem root the blob store writes under (C1).
    pub storage_root: PathBuf,
    /// Upload size cap in bytes (default 10 GiB).
    pub max_file_size: u64,
    /// Chunk size in bytes for the chunked-upload protocol (C2).
    pub chunk_size: u64,
    /// HTTP timeout for webhook deliveries, in seconds (C5).
    pub webhook_timeout_seconds: u64,
    /// Maximum webhook delivery attempts before giving up (C5).
    pub webhook_retry_attempts: u32,

    pub remote_storage_enabled: bool,
    pub remote_endpoint: Option<String>,
    pub remote_bucket: Option<String>,
    pub remote_key: Option<String>,
    pub remote_secret: Option<String>,
    pub remote_region: Option<String>,
    pub remote_key_prefix: Option<String>,
    /// Object size in bytes above which the remote mirror uses multipart
    /// upload (default 5 MiB).
    pub remote_multipart_threshold: u64,

    /// Bounded worker pool size, P, for the admission scheduler (C7).
    pub worker_pool_size: usize,

    /// Path to the external re-encoder binary used by the `cleaning`
    /// stage; absent or missing on disk makes `cleaning` a downgradable
    /// "skipped" stage rather than a failure.
    pub external_encoder_path: Option<PathBuf>,

    pub database_url: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            storage_root: PathBuf::from("./storage"),
            max_file_size: 10 * 1024 * 1024 * 1024,
            chunk_size: 5 * 1024 * 1024,
            webhook_timeout_seconds: 10,
            webhook_retry_attempts: 3,
            remote_storage_enabled: false,
            remote_endpoint: None,
            remote_bucket: None,
            remote_key: None,
            remote_secret: None,
            remote_region: None,
            remote_key_prefix: None,
            remote_multipart_threshold: 5 * 1024 * 1024,
            worker_pool_size: 2,
            external_encoder_path: None,
            database_url: "sqlite://./storage/forensic_pipeline.db".to_string(),
        }
    }
}

impl PipelineConfig {
    /// Loads configuration by layering defaults under any `FORENSIC_`
    /// prefixed environment variables, e.g. `FORENSIC_WORKER_POOL_SIZE=4`.
    pub fn load() -> Result<Self, ForensicError> {
        let defaults = Self::default();
        let builder = config::Config::builder()
            .add_source(config::Config::try_from(&defaults).map_err(config_err)?)
            .add_source(
                config::Environment::with_prefix("FORENSIC")
                    .separator("_")
                    .try_parsing(true),
            );
        let settings = builder.build().map_err(config_err)?;
        settings.try_deserialize().map_err(config_err)
    }

    pub fn allowed_extensions() -> &'static [&'static str] {
        &["mp4", "mov", "avi", "mkv", "webm"]
    }

    pub fn allowed_media_types() -> &'static [&'static str] {
        &[
            "video/mp4",
            "video/quicktime",
            "video/x-msvideo",
            "video/x-matroska",
            "video/webm",
        ]
    }
}

fn config_err(err: impl std::fmt::Display) -> ForensicError {
    ForensicError::internal(format!("configuration error: {err}"))
}
