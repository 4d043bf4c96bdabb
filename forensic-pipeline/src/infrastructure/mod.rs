// /////////////////////////////////////////////////////////////////////////////
// Forensic Video Pipeline
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! Infrastructure adapters: the implementations of the domain's ports.
//!
//! - [`blob_store`]: C1, local filesystem plus optional S3-compatible mirror
//! - [`chunk_assembler`]: C2, the chunked-upload assembly protocol
//! - [`repositories`]: C3, the durable `sqlx`/SQLite job store
//! - [`services`]: the webhook HTTP sender (C5's transport)
//! - [`workers`]: C4's five stage worker implementations
//! - [`runtime`]: task supervision helpers shared across components

pub mod blob_store;
pub mod chunk_assembler;
pub mod repositories;
pub mod runtime;
pub mod services;
pub mod workers;

pub use blob_store::{LocalBlobStore, S3Mirror};
pub use chunk_assembler::ChunkAssembler;
pub use repositories::SqliteJobStore;
pub use services::HttpWebhookSender;
