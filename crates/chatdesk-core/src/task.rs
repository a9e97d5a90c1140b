//! Detached background work.
//!
//! Bookkeeping that must never hold up a request (activity records,
//! presence write-back, ledger clears after a kick) goes through
//! [`spawn_detached`]. The caller gets nothing back to await; failures are
//! logged and dropped.

use std::future::Future;

use crate::result::AppResult;

/// Run `fut` on the runtime without keeping a handle to it.
///
/// `label` names the work in the log line emitted when it fails.
pub fn spawn_detached<F>(label: &'static str, fut: F)
where
    F: Future<Output = AppResult<()>> + Send + 'static,
{
    tokio::spawn(async move {
        if let Err(e) = fut.await {
            tracing::warn!(task = label, error = %e, "Detached task failed");
        }
    });
}
