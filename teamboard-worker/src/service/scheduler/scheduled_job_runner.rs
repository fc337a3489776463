use super::{clock::Clock, Error, ScheduledJob};
use chrono::{DateTime, Utc};
use cron::Schedule;
use std::{str::FromStr, sync::Arc, time::Duration};
use tokio::{sync::Notify, task::JoinHandle};

/// Longest single sleep, wall clock is checked again after it
const MAX_SLEEP: Duration = Duration::from_secs(60);

///
/// Runs every scheduled job on its own task.
///
/// Runs of the same job never overlap. Firings passed while a run is still
/// in progress are skipped and the next run starts at the first firing after it finished.
///
pub struct ScheduledJobRunner {
    clock: Clock,
    jobs: Vec<ScheduledJobHandle>,
}

struct ScheduledJobHandle {
    name: &'static str,
    task_handle: JoinHandle<()>,
    close_notify: Arc<Notify>,
}

impl ScheduledJobRunner {
    pub fn new() -> Self {
        Self::with_clock(Clock::System)
    }

    fn with_clock(clock: Clock) -> Self {
        Self {
            clock,
            jobs: Vec::new(),
        }
    }

    ///
    /// Starts running `job` at every firing of six field (with seconds) cron `expression`
    ///
    /// ### Errors
    /// - [Error::InvalidSchedule] when `expression` can't be parsed
    ///
    pub fn schedule(&mut self, expression: &str, job: Arc<dyn ScheduledJob>) -> Result<(), Error> {
        let schedule = Schedule::from_str(expression).map_err(|source| Error::InvalidSchedule {
            expression: expression.to_string(),
            source,
        })?;

        let name = job.name();
        tracing::info!(job = name, expression, "scheduling job");

        let close_notify = Arc::new(Notify::new());
        let task = ScheduledJobTask {
            schedule,
            job,
            clock: self.clock,
            close_notify: Arc::clone(&close_notify),
        };
        let task_handle = tokio::spawn(task.run());

        self.jobs.push(ScheduledJobHandle {
            name,
            task_handle,
            close_notify,
        });

        Ok(())
    }

    ///
    /// Stops all jobs, runs in progress are abandoned
    ///
    pub async fn close(self) {
        for job in &self.jobs {
            job.close_notify.notify_one();
        }

        for job in self.jobs {
            if let Err(err) = job.task_handle.await {
                tracing::error!(job = job.name, %err, "scheduled job task failed");
            }
        }
    }
}

impl Default for ScheduledJobRunner {
    fn default() -> Self {
        Self::new()
    }
}

struct ScheduledJobTask {
    schedule: Schedule,
    job: Arc<dyn ScheduledJob>,
    clock: Clock,
    close_notify: Arc<Notify>,
}

impl ScheduledJobTask {
    #[tracing::instrument(name = "Scheduled Job", skip_all, fields(job = self.job.name()))]
    async fn run(self) {
        let mut after = self.clock.now();
        loop {
            let Some(fire_at) = self.schedule.after(&after).next() else {
                tracing::warn!("schedule has no more firings");
                break;
            };

            tracing::debug!(%fire_at, "waiting for next firing");
            tokio::select! {
                _ = self.close_notify.notified() => break,
                _ = self.sleep_until(fire_at) => {}
            }

            tracing::info!(%fire_at, "running job");
            tokio::select! {
                _ = self.close_notify.notified() => {
                    tracing::info!("abandoning run");
                    break;
                }
                result = self.job.run() => match result {
                    Ok(()) => tracing::info!("job finished"),
                    Err(err) => tracing::error!("job failed: {err:#}"),
                },
            }

            let now = self.clock.now();
            let skipped = skipped_firings(&self.schedule, fire_at, now);
            if skipped > 0 {
                tracing::warn!(skipped, "run outlasted next firings, skipping them");
            }

            after = now.max(fire_at);
        }

        tracing::info!("stopped");
    }

    async fn sleep_until(&self, fire_at: DateTime<Utc>) {
        loop {
            let remaining = self.clock.until(fire_at);
            if remaining.is_zero() {
                return;
            }

            tokio::time::sleep(remaining.min(MAX_SLEEP)).await;
        }
    }
}

///
/// Number of firings after `fired_at` that passed until `now`
///
fn skipped_firings(schedule: &Schedule, fired_at: DateTime<Utc>, now: DateTime<Utc>) -> usize {
    schedule
        .after(&fired_at)
        .take_while(|firing| *firing <= now)
        .count()
}
