//! Cron trigger for the daily snapshot run

use std::sync::Arc;

use shared::RunTrigger;
use tokio_cron_scheduler::{Job, JobScheduler};

use crate::config::ReportConfig;
use crate::error::AppError;
use crate::services::{RunOutcome, SnapshotService};

/// Start the scheduler if enabled. The returned handle must be kept alive.
pub async fn start(
    config: &ReportConfig,
    snapshots: Arc<SnapshotService>,
) -> anyhow::Result<Option<JobScheduler>> {
    if !config.scheduler_enabled {
        tracing::info!("Snapshot scheduler disabled");
        return Ok(None);
    }

    let sched = JobScheduler::new()
        .await
        .map_err(|e| anyhow::anyhow!("creating scheduler: {e:?}"))?;

    let job = Job::new_async(config.schedule.as_str(), move |_uuid, _lock| {
        let snapshots = Arc::clone(&snapshots);
        Box::pin(async move {
            match snapshots.run(RunTrigger::Scheduled).await {
                Ok(RunOutcome::Published(summary)) => tracing::info!(
                    date = %summary.date,
                    key = %summary.file_name,
                    items = summary.items,
                    "Scheduled snapshot published"
                ),
                Ok(RunOutcome::NothingToDo { date }) => {
                    tracing::info!(date = %date, "Scheduled snapshot had nothing to do")
                }
                Err(AppError::RunInProgress(date)) => {
                    tracing::warn!(date = %date, "Scheduled snapshot skipped, run in progress")
                }
                // Already logged by the service; the scheduler keeps running
                Err(_) => {}
            }
        })
    })
    .map_err(|e| anyhow::anyhow!("invalid schedule {:?}: {e:?}", config.schedule))?;

    sched
        .add(job)
        .await
        .map_err(|e| anyhow::anyhow!("registering snapshot job: {e:?}"))?;
    sched
        .start()
        .await
        .map_err(|e| anyhow::anyhow!("starting scheduler: {e:?}"))?;

    tracing::info!(schedule = %config.schedule, "Snapshot scheduler started");
    Ok(Some(sched))
}
