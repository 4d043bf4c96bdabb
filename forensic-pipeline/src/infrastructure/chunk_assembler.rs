// /////////////////////////////////////////////////////////////////////////////
// Forensic Video Pipeline
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! The chunked-upload assembly protocol (C2): chunks are written
//! durably before acknowledgement, may arrive in any order, and
//! re-receiving an index overwrites rather than double-counting.
//!
//! Each upload gets its own directory under `storage_root/uploads/`, one
//! file per chunk (`chunk_00000`, `chunk_00001`, ...). The bitmap of
//! which indices have arrived lives in the [`Upload`] entity, persisted
//! through the job store, so a restart can recompute completion without
//! re-reading chunk bytes.

use forensic_pipeline_domain::entities::Upload;
use forensic_pipeline_domain::error::ForensicError;
use forensic_pipeline_domain::repositories::JobStore;
use forensic_pipeline_domain::value_objects::UploadId;
use chrono::Utc;
use sha2::{Digest, Sha256};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::fs;
use tokio::io::AsyncWriteExt;

pub struct ChunkAssembler {
    uploads_root: PathBuf,
    job_store: Arc<dyn JobStore>,
}

impl ChunkAssembler {
    pub fn new(storage_root: impl Into<PathBuf>, job_store: Arc<dyn JobStore>) -> Self {
        Self {
            uploads_root: storage_root.into().join("uploads"),
            job_store,
        }
    }

    fn upload_dir(&self, id: UploadId) -> PathBuf {
        self.uploads_root.join(id.to_string())
    }

    fn chunk_path(&self, id: UploadId, index: u32) -> PathBuf {
        self.upload_dir(id).join(format!("chunk_{index:05}"))
    }

    /// Validates the declared filename/media type/size, allocates a
    /// fresh upload id, and creates the on-disk and persisted session.
    pub async fn init(
        &self,
        original_filename: impl Into<String>,
        total_size_bytes: u64,
        media_type: &str,
        max_file_size: u64,
        chunk_size: u64,
        allowed_extensions: &[&str],
        allowed_media_types: &[&str],
    ) -> Result<Upload, ForensicError> {
        let original_filename = original_filename.into();
        if total_size_bytes == 0 {
            return Err(ForensicError::validation("file size must be greater than zero"));
        }
        if total_size_bytes > max_file_size {
            return Err(ForensicError::validation(format!(
                "file size {total_size_bytes} exceeds configured maximum {max_file_size}"
            )));
        }
        let extension = original_filename
            .rsplit('.')
            .next()
            .map(|ext| ext.to_ascii_lowercase())
            .unwrap_or_default();
        if !allowed_extensions.contains(&extension.as_str()) {
            return Err(ForensicError::validation(format!(
                "file extension .{extension} is not an accepted video format"
            )));
        }
        if !allowed_media_types.contains(&media_type) {
            return Err(ForensicError::validation(format!(
                "media type {media_type} is not an accepted video format"
            )));
        }

        let total_chunks = total_size_bytes.div_ceil(chunk_size).max(1) as u32;
        let upload = Upload::new(UploadId::new(), original_filename, total_size_bytes, total_chunks, Utc::now())?;

        fs::create_dir_all(self.upload_dir(upload.id)).await?;
        self.job_store.create_upload(upload.clone()).await?;
        Ok(upload)
    }

    /// Writes one chunk to disk, then records its arrival. Idempotent:
    /// re-sending the same index overwrites the file and leaves the
    /// received count unchanged.
    pub async fn put_chunk(&self, id: UploadId, index: u32, bytes: &[u8]) -> Result<Upload, ForensicError> {
        let upload = self.job_store.get_upload(id).await?;
        if index >= upload.total_chunks {
            return Err(ForensicError::validation(format!(
                "chunk index {index} out of range for {} total chunks",
                upload.total_chunks
            )));
        }

        let path = self.chunk_path(id, index);
        let tmp_path = path.with_extension(format!("tmp-{}", uuid::Uuid::new_v4()));
        let mut file = fs::File::create(&tmp_path).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);
        fs::rename(&tmp_path, &path).await?;

        self.job_store.record_chunk(id, index).await
    }

    /// Reassembles the chunks in index order, computes the SHA-256 of
    /// the whole file, and deletes the chunk directory and session.
    /// Fails with `Conflict` if any index is still missing.
    pub async fn complete(&self, id: UploadId) -> Result<(Vec<u8>, String, Upload), ForensicError> {
        let upload = self.job_store.get_upload(id).await?;
        if !upload.is_complete() {
            return Err(ForensicError::conflict(format!(
                "upload {id} is missing chunks: {:?}",
                upload.missing_chunks()
            )));
        }

        let mut assembled = Vec::with_capacity(upload.total_size_bytes as usize);
        for index in 0..upload.total_chunks {
            let chunk = fs::read(self.chunk_path(id, index)).await?;
            assembled.extend_from_slice(&chunk);
        }

        let mut hasher = Sha256::new();
        hasher.update(&assembled);
        let sha256 = hex::encode(hasher.finalize());

        fs::remove_dir_all(self.upload_dir(id)).await.ok();
        self.job_store.delete_upload(id).await?;

        Ok((assembled, sha256, upload))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::repositories::SqliteJobStore;

    const EXTS: &[&str] = &["mp4", "mov", "avi", "mkv", "webm"];
    const TYPES: &[&str] = &["video/mp4"];

    async fn new_assembler() -> (ChunkAssembler, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteJobStore::connect(&format!("sqlite://{}/db.sqlite?mode=rwc", dir.path().display()))
            .await
            .unwrap();
        let assembler = ChunkAssembler::new(dir.path(), Arc::new(store));
        (assembler, dir)
    }

    #[tokio::test]
    async fn init_rejects_disallowed_extension() {
        let (assembler, _dir) = new_assembler().await;
        let err = assembler
            .init("evidence.txt", 1024, "video/mp4", 10_000, 512, EXTS, TYPES)
            .await
            .unwrap_err();
        assert_eq!(err.category(), "validation");
    }

    #[tokio::test]
    async fn init_rejects_zero_size() {
        let (assembler, _dir) = new_assembler().await;
        let err = assembler
            .init("evidence.mp4", 0, "video/mp4", 10_000, 512, EXTS, TYPES)
            .await
            .unwrap_err();
        assert_eq!(err.category(), "validation");
    }

    #[tokio::test]
    async fn out_of_order_chunks_reassemble_correctly() {
        let (assembler, _dir) = new_assembler().await;
        let upload = assembler
            .init("evidence.mp4", 12, "video/mp4", 10_000, 5, EXTS, TYPES)
            .await
            .unwrap();
        assert_eq!(upload.total_chunks, 3);

        assembler.put_chunk(upload.id, 2, b"wxyz").await.unwrap();
        assembler.put_chunk(upload.id, 0, b"abcde").await.unwrap();
        assembler.put_chunk(upload.id, 1, b"fghij").await.unwrap();

        let (bytes, sha256, _) = assembler.complete(upload.id).await.unwrap();
        assert_eq!(bytes, b"abcdefghijwxyz");
        assert_eq!(sha256.len(), 64);
    }

    #[tokio::test]
    async fn duplicate_chunk_overwrites_without_double_counting() {
        let (assembler, _dir) = new_assembler().await;
        let upload = assembler
            .init("evidence.mp4", 10, "video/mp4", 10_000, 5, EXTS, TYPES)
            .await
            .unwrap();
        assembler.put_chunk(upload.id, 0, b"wrong").await.unwrap();
        let refreshed = assembler.put_chunk(upload.id, 0, b"right").await.unwrap();
        assert_eq!(refreshed.chunks_received(), 1);
        assembler.put_chunk(upload.id, 1, b"right").await.unwrap();
        let (bytes, _, _) = assembler.complete(upload.id).await.unwrap();
        assert_eq!(bytes, b"rightright");
    }

    #[tokio::test]
    async fn complete_rejects_incomplete_upload() {
        let (assembler, _dir) = new_assembler().await;
        let upload = assembler
            .init("evidence.mp4", 10, "video/mp4", 10_000, 5, EXTS, TYPES)
            .await
            .unwrap();
        assembler.put_chunk(upload.id, 0, b"right").await.unwrap();
        let err = assembler.complete(upload.id).await.unwrap_err();
        assert_eq!(err.category(), "conflict");
    }

    #[tokio::test]
    async fn chunk_index_at_total_chunks_is_out_of_range() {
        let (assembler, _dir) = new_assembler().await;
        let upload = assembler
            .init("evidence.mp4", 10, "video/mp4", 10_000, 5, EXTS, TYPES)
            .await
            .unwrap();
        let err = assembler.put_chunk(upload.id, upload.total_chunks, b"x").await.unwrap_err();
        assert_eq!(err.category(), "validation");
    }
}
