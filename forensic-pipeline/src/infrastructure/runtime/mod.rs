// /////////////////////////////////////////////////////////////////////////////
// Forensic Video Pipeline
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! Task supervision helpers shared by the scheduler and webhook dispatcher.

pub mod supervisor;

pub use supervisor::{join_supervised, spawn_supervised, AppResult};
