// /////////////////////////////////////////////////////////////////////////////
// Forensic Video Pipeline
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! Filesystem-backed [`BlobStore`]: writes are atomic (write-temp-then-rename)
//! and SHA-256 is computed in the same pass, so `put` never leaves a
//! partially written file visible under its final id.

use forensic_pipeline_domain::entities::StorageLocation;
use forensic_pipeline_domain::error::ForensicError;
use forensic_pipeline_domain::services::BlobStore;
use forensic_pipeline_domain::value_objects::FileId;
use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

pub struct LocalBlobStore {
    root: PathBuf,
}

impl LocalBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, id: FileId) -> PathBuf {
        self.root.join(id.to_string())
    }

    /// Writes `bytes` atomically under `id`, returning the SHA-256 hex
    /// digest alongside the final path the caller can hand to
    /// [`BlobStore::put`]'s `StorageLocation`.
    pub async fn put_with_digest(
        &self,
        id: FileId,
        bytes: &[u8],
    ) -> Result<(StorageLocation, String), ForensicError> {
        fs::create_dir_all(&self.root).await?;
        let final_path = self.path_for(id);
        let tmp_path = self.root.join(format!("{id}.tmp-{}", uuid::Uuid::new_v4()));

        let mut file = fs::File::create(&tmp_path).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        fs::rename(&tmp_path, &final_path).await?;

        let mut hasher = Sha256::new();
        hasher.update(bytes);
        let digest = hex::encode(hasher.finalize());

        Ok((
            StorageLocation::Local {
                path: final_path.display().to_string(),
            },
            digest,
        ))
    }

    fn local_path(location: &StorageLocation) -> Result<&Path, ForensicError> {
        match location {
            StorageLocation::Local { path } => Ok(Path::new(path)),
            StorageLocation::Remote { .. } => Err(ForensicError::internal(
                "local blob store cannot resolve a remote storage location",
            )),
        }
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn put(&self, id: FileId, bytes: Vec<u8>) -> Result<StorageLocation, ForensicError> {
        let (location, _digest) = self.put_with_digest(id, &bytes).await?;
        Ok(location)
    }

    async fn get(&self, id: FileId) -> Result<Vec<u8>, ForensicError> {
        let path = self.path_for(id);
        fs::read(&path)
            .await
            .map_err(|e| ForensicError::not_found(format!("file {id} not on disk: {e}")))
    }

    async fn delete(&self, id: FileId) -> Result<(), ForensicError> {
        let path = self.path_for(id);
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn exists(&self, id: FileId) -> Result<bool, ForensicError> {
        Ok(fs::try_exists(self.path_for(id)).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_then_get_round_trips_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path());
        let id = FileId::new();
        store.put(id, b"hello forensics".to_vec()).await.unwrap();
        let bytes = store.get(id).await.unwrap();
        assert_eq!(bytes, b"hello forensics");
    }

    #[tokio::test]
    async fn put_with_digest_computes_sha256() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path());
        let id = FileId::new();
        let (_location, digest) = store.put_with_digest(id, b"abc").await.unwrap();
        assert_eq!(
            digest,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[tokio::test]
    async fn exists_is_false_before_put() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path());
        assert!(!store.exists(FileId::new()).await.unwrap());
    }

    #[tokio::test]
    async fn delete_is_idempotent_for_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path());
        store.delete(FileId::new()).await.unwrap();
    }

    #[tokio::test]
    async fn get_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path());
        let err = store.get(FileId::new()).await.unwrap_err();
        assert_eq!(err.category(), "not_found");
    }
}
