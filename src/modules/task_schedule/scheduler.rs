use chrono::Local;
use std::str::FromStr;
use std::sync::Arc;
use tokio::task::JoinHandle;

use super::service::IngestSynchronizer;

// sec  min  hour  day-of-month  month  day-of-week  year
pub fn parse_schedule(crontab: &str) -> Result<cron::Schedule, cron::error::Error> {
    cron::Schedule::from_str(crontab)
}

/// Runs the contact sync on every tick of `schedule` (local time). Each
/// run is spawned on its own, so a slow run does not delay the next tick.
pub fn spawn_ingest_job(schedule: cron::Schedule, sync: Arc<IngestSynchronizer>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut upcoming = schedule.upcoming_owned(Local);

        while let Some(next) = upcoming.next() {
            let Ok(delay) = (next - Local::now()).to_std() else {
                continue;
            };

            tracing::debug!(%next, "waiting for next contact sync");
            tokio::time::sleep(delay).await;

            tracing::info!("running scheduled contact sync");
            let sync = Arc::clone(&sync);
            tokio::spawn(async move {
                if let Err(e) = sync.run().await {
                    tracing::error!(error = %e, "scheduled contact sync failed");
                }
            });
        }

        tracing::info!("contact sync schedule exhausted");
    })
}
