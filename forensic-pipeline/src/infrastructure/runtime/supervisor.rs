// /////////////////////////////////////////////////////////////////////////////
// Forensic Video Pipeline
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! Supervised task spawning: wraps `tokio::spawn` so a background task's
//! result is always observed instead of silently dropped.

use forensic_pipeline_domain::ForensicError;
use tokio::task::JoinHandle;
use tracing::{debug, error};

pub type AppResult<T> = Result<T, ForensicError>;

/// Spawns `fut`, logging its outcome. Callers must still await the
/// returned handle with [`join_supervised`] — this only adds logging, it
/// does not detach the task.
pub fn spawn_supervised<F, T>(name: &'static str, fut: F) -> JoinHandle<AppResult<T>>
where
    F: std::future::Future<Output = AppResult<T>> + Send + 'static,
    T: Send + 'static,
{
    debug!(task = name, "task starting");

    tokio::spawn(async move {
        let result = fut.await;
        match &result {
            Ok(_) => debug!(task = name, "task completed successfully"),
            Err(e) => error!(task = name, error = ?e, "task failed"),
        }
        result
    })
}

/// Awaits a supervised task, converting panics and cancellation into
/// [`ForensicError::Internal`].
pub async fn join_supervised<T>(handle: JoinHandle<AppResult<T>>) -> AppResult<T> {
    match handle.await {
        Ok(task_result) => task_result,
        Err(e) if e.is_panic() => Err(ForensicError::internal(format!("task panicked: {e}"))),
        Err(e) => Err(ForensicError::internal(format!("task join failed: {e}"))),
    }
}
