// /////////////////////////////////////////////////////////////////////////////
// Forensic Video Pipeline
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! Core business logic for the forensic video analysis pipeline,
//! independent of databases, filesystems, HTTP, and any other external
//! concern.
//!
//! ## Module structure
//!
//! - [`entities`]: [`entities::Job`], [`entities::Stage`],
//!   [`entities::FileRecord`], [`entities::Upload`] — objects with
//!   identity that change state over their lifecycle
//! - [`aggregates`]: [`aggregates::JobAggregate`], the consistency
//!   boundary enforcing valid job/stage transitions
//! - [`value_objects`]: identifiers, the fixed stage ordering, and the
//!   shared datetime serde adapter
//! - [`services`]: ports ([`services::StageWorker`],
//!   [`services::BlobStore`], [`services::WebhookSender`]) that
//!   infrastructure implements
//! - [`repositories`]: the [`repositories::JobStore`] port for durable
//!   orchestration state
//! - [`error`]: [`error::ForensicError`], the domain-wide error taxonomy

pub mod aggregates;
pub mod entities;
pub mod error;
pub mod repositories;
pub mod services;
pub mod value_objects;

pub use aggregates::JobAggregate;
pub use entities::{FileRecord, Job, JobProgress, JobStatus, Stage, StageStatus, StorageLocation, Upload};
pub use error::ForensicError;
pub use repositories::JobStore;
pub use value_objects::{FileId, JobId, StageName, UploadId};
