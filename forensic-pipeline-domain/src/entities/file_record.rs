// /////////////////////////////////////////////////////////////////////////////
// Forensic Video Pipeline
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! The `FileRecord` entity: a durable artifact addressed by content hash,
//! whether a freshly assembled upload or a byproduct of a stage (e.g. a
//! cleaned copy).

use crate::value_objects::{datetime_serde, FileId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where a file's bytes live once the upload finishes assembling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum StorageLocation {
    /// A path on the local filesystem, under the configured storage root.
    Local { path: String },
    /// An object key in a remote, S3-compatible mirror.
    Remote { bucket: String, key: String },
}

/// A durable artifact: the original upload, or any file a stage produces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileRecord {
    pub id: FileId,
    pub original_filename: String,
    pub content_type: Option<String>,
    pub size_bytes: u64,
    pub sha256: String,
    pub location: StorageLocation,
    /// Set once a remote mirror upload completes; `None` if mirroring is
    /// disabled or still in flight.
    pub mirrored_location: Option<StorageLocation>,
    #[serde(with = "datetime_serde")]
    pub created_at: DateTime<Utc>,
}

impl FileRecord {
    pub fn new(
        id: FileId,
        original_filename: impl Into<String>,
        content_type: Option<String>,
        size_bytes: u64,
        sha256: impl Into<String>,
        location: StorageLocation,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            original_filename: original_filename.into(),
            content_type,
            size_bytes,
            sha256: sha256.into(),
            location,
            mirrored_location: None,
            created_at: now,
        }
    }

    pub fn mark_mirrored(&mut self, location: StorageLocation) {
        self.mirrored_location = Some(location);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_file_record_has_no_mirror() {
        let record = FileRecord::new(
            FileId::new(),
            "clip.mp4",
            Some("video/mp4".to_string()),
            4096,
            "deadbeef",
            StorageLocation::Local {
                path: "/data/clip.mp4".to_string(),
            },
            Utc::now(),
        );
        assert!(record.mirrored_location.is_none());
    }

    #[test]
    fn mark_mirrored_records_remote_location() {
        let mut record = FileRecord::new(
            FileId::new(),
            "clip.mp4",
            None,
            4096,
            "deadbeef",
            StorageLocation::Local {
                path: "/data/clip.mp4".to_string(),
            },
            Utc::now(),
        );
        record.mark_mirrored(StorageLocation::Remote {
            bucket: "evidence".to_string(),
            key: record.id.to_string(),
        });
        assert!(matches!(record.mirrored_location, Some(StorageLocation::Remote { .. })));
    }
}
