//! Periodic eviction of finished simulated jobs.
//!
//! Spawns a background task that drops jobs which reached a terminal state
//! longer ago than the simulator's retention window. Runs on a fixed
//! interval using `tokio::time::interval`.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use vidrelay_core::simulator::SimulatedJobs;

/// Run the job retention loop until `cancel` is triggered.
///
/// Returns immediately when the simulator keeps jobs forever (zero retention).
pub async fn run(jobs: Arc<SimulatedJobs>, interval: Duration, cancel: CancellationToken) {
    let retention = jobs.config().retention;
    if retention.is_zero() {
        tracing::info!("Job retention disabled");
        return;
    }

    tracing::info!(
        retention_secs = retention.as_secs(),
        interval_secs = interval.as_secs(),
        "Job retention task started"
    );

    let mut ticker = tokio::time::interval(interval);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Job retention task stopping");
                break;
            }
            _ = ticker.tick() => {
                let purged = jobs.purge_expired().await;
                if purged > 0 {
                    tracing::info!(purged, "Job retention: purged finished jobs");
                } else {
                    tracing::debug!("Job retention: nothing to purge");
                }
            }
        }
    }
}
