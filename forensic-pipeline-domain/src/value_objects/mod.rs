// /////////////////////////////////////////////////////////////////////////////
// Forensic Video Pipeline
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! Value objects: immutable, identity-free types that enforce business
//! rules at construction.
//!
//! - [`JobId`], [`FileId`], [`UploadId`]: opaque identifiers
//! - [`StageName`]: the fixed, ordered set of analysis stages
//! - [`datetime_serde`]: RFC3339 serde adapter shared by every timestamp field

pub mod datetime_serde;
pub mod ids;
pub mod stage_name;

pub use ids::{FileId, JobId, UploadId};
pub use stage_name::StageName;
