// /////////////////////////////////////////////////////////////////////////////
// Forensic Video Pipeline
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! Domain error module — see [`ForensicError`] for the taxonomy.

mod forensic_error;

pub use forensic_error::ForensicError;
