// /////////////////////////////////////////////////////////////////////////////
// Forensic Video Pipeline
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! The application-layer services: the stateful machinery that drives a
//! job from submission to report, built on the domain's ports.
//!
//! - [`stage_registry`]: C4, binds each `StageName` to its worker
//! - [`executor`]: C6, the per-job state machine
//! - [`scheduler`]: C7, the bounded worker pool and admission queue
//! - [`webhook_dispatcher`]: C5, at-least-once per-job-ordered delivery
//! - [`progress_aggregator`]: C8, stage statistics as a pure function
//! - [`artifact_publisher`]: C9, the single choke point for writing a
//!   job-attached file
//! - [`report_builder`]: assembles the forensic report JSON (spec §6.2)

pub mod artifact_publisher;
pub mod executor;
pub mod progress_aggregator;
pub mod report_builder;
pub mod scheduler;
pub mod stage_registry;
pub mod webhook_dispatcher;

pub use artifact_publisher::{ArtifactKind, ArtifactPublisher};
pub use executor::Executor;
pub use progress_aggregator::ProgressSnapshot;
pub use scheduler::Scheduler;
pub use stage_registry::StageRegistry;
pub use webhook_dispatcher::WebhookDispatcher;
