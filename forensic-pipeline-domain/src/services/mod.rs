// /////////////////////////////////////////////////////////////////////////////
// Forensic Video Pipeline
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! Domain services and ports.
//!
//! [`StageWorker`] and [`BlobStore`]/[`BlobMirror`]/[`WebhookSender`] are
//! traits (ports, in the hexagonal sense): the domain defines the
//! contract, infrastructure supplies the implementation.

pub mod analyzer_results;
pub mod blob_store;
pub mod stage_worker;
pub mod webhook;

pub use analyzer_results::{
    ClassificationResult, CleaningResult, FftResult, MetadataResult, PrnuResult,
};
pub use blob_store::{BlobMirror, BlobStore};
pub use stage_worker::{StageInput, StageResult, StageWorker};
pub use webhook::{WebhookEnvelope, WebhookEventKind, WebhookSender};
