// /////////////////////////////////////////////////////////////////////////////
// Forensic Video Pipeline
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! The `Upload` entity: a transient chunked-upload session tracking which
//! chunks of one file have arrived.
//!
//! Chunks may arrive out of order and may be retried; receiving the same
//! index twice is not an error. The session is complete once every index
//! in `0..total_chunks` has been seen at least once.

use crate::error::ForensicError;
use crate::value_objects::{datetime_serde, UploadId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Upload {
    pub id: UploadId,
    pub original_filename: String,
    pub total_size_bytes: u64,
    pub total_chunks: u32,
    pub received_chunks: BTreeSet<u32>,
    #[serde(with = "datetime_serde")]
    pub created_at: DateTime<Utc>,
}

impl Upload {
    pub fn new(
        id: UploadId,
        original_filename: impl Into<String>,
        total_size_bytes: u64,
        total_chunks: u32,
        now: DateTime<Utc>,
    ) -> Result<Self, ForensicError> {
        if total_chunks == 0 {
            return Err(ForensicError::validation("total_chunks must be at least 1"));
        }
        Ok(Self {
            id,
            original_filename: original_filename.into(),
            total_size_bytes,
            total_chunks,
            received_chunks: BTreeSet::new(),
            created_at: now,
        })
    }

    /// Records that `index` has arrived. Idempotent: receiving the same
    /// index twice leaves the session unchanged and succeeds.
    pub fn record_chunk(&mut self, index: u32) -> Result<(), ForensicError> {
        if index >= self.total_chunks {
            return Err(ForensicError::validation(format!(
                "chunk index {index} out of range for {} total chunks",
                self.total_chunks
            )));
        }
        self.received_chunks.insert(index);
        Ok(())
    }

    pub fn is_complete(&self) -> bool {
        self.received_chunks.len() as u32 == self.total_chunks
    }

    /// Indices not yet received, for status reporting and resumption.
    pub fn missing_chunks(&self) -> Vec<u32> {
        (0..self.total_chunks)
            .filter(|i| !self.received_chunks.contains(i))
            .collect()
    }

    pub fn chunks_received(&self) -> u32 {
        self.received_chunks.len() as u32
    }
}
