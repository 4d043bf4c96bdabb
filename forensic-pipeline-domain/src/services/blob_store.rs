// /////////////////////////////////////////////////////////////////////////////
// Forensic Video Pipeline
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! The `BlobStore` port: durable storage for file bytes, independent of
//! whether the backing medium is the local filesystem or a remote
//! S3-compatible mirror.

use crate::entities::StorageLocation;
use crate::error::ForensicError;
use crate::value_objects::FileId;
use async_trait::async_trait;

/// Durable storage for one file's bytes, addressed by [`FileId`].
///
/// Implementations must make `put` atomic with respect to concurrent
/// readers: a partially written file must never be visible under its
/// final id.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn put(&self, id: FileId, bytes: Vec<u8>) -> Result<StorageLocation, ForensicError>;

    async fn get(&self, id: FileId) -> Result<Vec<u8>, ForensicError>;

    async fn delete(&self, id: FileId) -> Result<(), ForensicError>;

    async fn exists(&self, id: FileId) -> Result<bool, ForensicError>;
}

/// An optional secondary mirror (e.g. a CDN-backed bucket). Separate from
/// [`BlobStore`] because mirroring is best-effort: a mirror failure must
/// never fail the job whose file it was mirroring.
#[async_trait]
pub trait BlobMirror: Send + Sync {
    async fn mirror(&self, id: FileId, bytes: &[u8]) -> Result<StorageLocation, ForensicError>;
}
