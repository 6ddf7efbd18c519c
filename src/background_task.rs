use tokio::{sync::watch, time::{interval, Duration, MissedTickBehavior}};

use crate::{graceful_shutdown::wait_for_shutdown, AppProjectCleanup};

/// Periodically purges project image folders no project document refers to.
/// Returns when the shutdown flag is raised.
pub async fn start_orphan_sweep(
    cleanup: AppProjectCleanup,
    every: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut interval = interval(every);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // the first tick completes immediately
    interval.tick().await;

    loop {
        tokio::select! {
            _ = interval.tick() => {}
            _ = wait_for_shutdown(&mut shutdown) => {
                tracing::info!("Orphan sweep stopped");
                return;
            }
        }

        match cleanup.sweep_orphans().await {
            Ok(report) => tracing::info!(
                checked = report.namespaces_checked,
                purged = report.namespaces_purged,
                blobs_deleted = report.blobs_deleted,
                blobs_failed = report.blobs_failed,
                "Orphan sweep finished"
            ),
            Err(e) => tracing::error!("Orphan sweep failed: {}", e)
        }
    }
}
