// /////////////////////////////////////////////////////////////////////////////
// Forensic Video Pipeline
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! Cross-cutting infrastructure services that aren't a repository or a
//! blob adapter.
//!
//! - **HttpWebhookSender**: single-attempt HTTP POST transport for C5; the
//!   retry/backoff loop and per-job ordering live in the application-layer
//!   dispatcher, which calls this repeatedly.

pub mod webhook_sender;

pub use webhook_sender::HttpWebhookSender;
