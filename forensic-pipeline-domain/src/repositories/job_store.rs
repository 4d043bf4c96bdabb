// /////////////////////////////////////////////////////////////////////////////
// Forensic Video Pipeline
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! The `JobStore` port: the durable, crash-recoverable source of truth
//! for jobs, their stages, and the files and uploads they reference.
//!
//! Every method is atomic with respect to a single job: two concurrent
//! callers racing to admit the same job's next stage must not both
//! succeed. Implementations back this with a transaction, not
//! application-level locking.

use crate::entities::{FileRecord, Job, Stage, Upload};
use crate::error::ForensicError;
use crate::value_objects::{FileId, JobId, StageName, UploadId};
use async_trait::async_trait;

/// Durable storage for the orchestration state machine.
#[async_trait]
pub trait JobStore: Send + Sync {
    async fn create_upload(&self, upload: Upload) -> Result<(), ForensicError>;
    async fn get_upload(&self, id: UploadId) -> Result<Upload, ForensicError>;
    async fn record_chunk(&self, id: UploadId, index: u32) -> Result<Upload, ForensicError>;
    async fn delete_upload(&self, id: UploadId) -> Result<(), ForensicError>;

    async fn save_file(&self, file: FileRecord) -> Result<(), ForensicError>;
    async fn get_file(&self, id: FileId) -> Result<FileRecord, ForensicError>;
    async fn update_file(&self, file: FileRecord) -> Result<(), ForensicError>;

    /// Creates a job together with its five pending stage rows, in one
    /// transaction, so a reader never observes a job without its stages.
    async fn create_job(&self, job: Job, stages: Vec<Stage>) -> Result<(), ForensicError>;

    /// Creates the job's `original` `FileRecord` together with the job and
    /// its stage rows, all in one transaction (spec §4.3), so a crash
    /// between steps can never leave a job whose `source_file` points at a
    /// record that was never written.
    async fn create_job_with_file(&self, file: FileRecord, job: Job, stages: Vec<Stage>) -> Result<(), ForensicError>;

    async fn get_job(&self, id: JobId) -> Result<Job, ForensicError>;
    async fn list_jobs(&self) -> Result<Vec<Job>, ForensicError>;

    /// Atomically transitions a job from `Pending` to `Running` and a
    /// named stage from `Pending` to `Running`, returning both updated
    /// rows. Fails with [`ForensicError::Conflict`] if the job or stage
    /// is not in the expected prior state, so two schedulers racing to
    /// admit the same job's stage cannot both win.
    async fn admit_stage(&self, job_id: JobId, stage: StageName) -> Result<(Job, Stage), ForensicError>;

    async fn update_job(&self, job: Job) -> Result<(), ForensicError>;
    async fn update_stage(&self, stage: Stage) -> Result<(), ForensicError>;

    async fn get_stage(&self, job_id: JobId, stage: StageName) -> Result<Stage, ForensicError>;
    async fn list_stages(&self, job_id: JobId) -> Result<Vec<Stage>, ForensicError>;

    /// Jobs left `Running` by a prior process that did not shut down
    /// cleanly, for the bootstrap scan to re-admit.
    async fn list_running_jobs(&self) -> Result<Vec<Job>, ForensicError>;
}
