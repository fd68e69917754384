//! Database poll loop for the standalone worker.
//!
//! Requests created by an API process without an embedded dispatcher only
//! exist as `pending` rows; this loop periodically feeds them into the local
//! [`JobQueue`].

use std::sync::Arc;
use std::time::Duration;

use skyqueue_db::store::RequestStore;
use tokio_util::sync::CancellationToken;

use crate::queue::{recover_pending, JobQueue};

/// Run the poll loop until `cancel` is triggered.
pub async fn run(
    store: Arc<dyn RequestStore>,
    queue: JobQueue,
    interval: Duration,
    cancel: CancellationToken,
) {
    tracing::info!(interval_ms = interval.as_millis() as u64, "Pending request poller started");

    let mut ticker = tokio::time::interval(interval);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Pending request poller stopping");
                break;
            }
            _ = ticker.tick() => {
                match recover_pending(store.as_ref(), &queue).await {
                    Ok(0) => tracing::trace!("No pending weather requests"),
                    Ok(count) => tracing::debug!(count, "Enqueued pending weather requests"),
                    Err(e) => tracing::error!(error = %e, "Poll cycle failed"),
                }
            }
        }
    }
}
