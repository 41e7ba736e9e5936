use std::sync::Arc;
use std::sync::atomic::Ordering;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use super::ScheduleSweeper;
use crate::error::ServiceResult;

/// Owner of a running periodic sweep.
///
/// Dropping the handle stops the timer as if [`SweepHandle::stop`] had been
/// called.
#[derive(Debug)]
pub struct SweepHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl SweepHandle {
    /// Stops scheduling sweeps. A sweep already running finishes first.
    pub fn stop(&self) {
        self.shutdown.send_replace(true);
    }

    /// ## Summary
    /// Waits for the timer task to exit.
    ///
    /// ## Errors
    /// Returns `ServiceError::TaskJoin` if the task panicked.
    pub async fn join(self) -> ServiceResult<()> {
        let Self { shutdown, task } = self;
        task.await?;
        drop(shutdown);
        Ok(())
    }
}

impl ScheduleSweeper {
    /// ## Summary
    /// Starts the timer: one sweep after the startup delay, then one per
    /// sweep interval. Late ticks are delayed rather than bunched up.
    ///
    /// Returns `None`, and starts nothing, if this sweeper already has a
    /// live timer.
    #[must_use]
    pub fn start_periodic_sweep(self: &Arc<Self>) -> Option<SweepHandle> {
        if self.running.swap(true, Ordering::SeqCst) {
            tracing::warn!("Periodic schedule sweep already running");
            return None;
        }

        let (shutdown, mut stopped) = watch::channel(false);
        let sweeper = Arc::clone(self);
        let period = self.settings.sweep_interval();
        let first = Instant::now() + self.settings.startup_delay();

        tracing::info!(
            interval_secs = period.as_secs(),
            startup_delay_secs = self.settings.startup_delay().as_secs(),
            "Starting periodic schedule sweep"
        );

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(first, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;
                    _ = stopped.changed() => break,
                    _ = ticker.tick() => {
                        sweeper.run_sweep_once().await;
                    }
                }
            }

            sweeper.running.store(false, Ordering::SeqCst);
            tracing::info!("Periodic schedule sweep stopped");
        });

        Some(SweepHandle { shutdown, task })
    }
}
