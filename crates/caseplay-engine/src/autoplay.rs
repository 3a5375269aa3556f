//! Autoplay: a repeating timer that asks the engine to advance.

use std::time::Duration;

use caseplay_core::{ReplayError, ReplayResult};
use caseplay_events::{EventBus, EventMetadata, ReplayEvent};
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::engine::RunRequest;

const SOURCE: &str = "autoplay";

/// Guard that aborts a spawned Tokio task when dropped.
///
/// Dropping a `JoinHandle` detaches the task instead of cancelling it.
struct AbortOnDrop(tokio::task::JoinHandle<()>);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Periodically posts [`RunRequest::Advance`] while enabled.
///
/// The timer only posts requests; it never starts or stops a run itself.
/// It holds a weak sender so an enabled scheduler does not keep the
/// request channel open after every engine handle is gone.
pub struct AutoplayScheduler {
    period: Duration,
    requests: mpsc::WeakSender<RunRequest>,
    bus: EventBus,
    ticker: Option<AbortOnDrop>,
}

impl AutoplayScheduler {
    /// Create a disabled scheduler.
    ///
    /// # Errors
    ///
    /// Returns [`ReplayError::InvalidConfig`] if `period` is zero.
    pub fn new(
        period: Duration,
        requests: mpsc::WeakSender<RunRequest>,
        bus: EventBus,
    ) -> ReplayResult<Self> {
        if period.is_zero() {
            return Err(ReplayError::InvalidConfig {
                field: "autoplay.period".to_string(),
                reason: "must be non-zero".to_string(),
            });
        }
        Ok(Self {
            period,
            requests,
            bus,
            ticker: None,
        })
    }

    /// Whether the timer is running.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.ticker.is_some()
    }

    /// Time between ticks.
    #[must_use]
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Start or stop the timer.
    ///
    /// The first tick fires one full period after enabling. Returns whether
    /// the state changed; repeating the current state is a no-op.
    pub fn set_enabled(&mut self, enabled: bool) -> bool {
        if enabled == self.is_enabled() {
            return false;
        }

        if enabled {
            self.ticker = Some(AbortOnDrop(self.spawn_ticker()));
        } else {
            self.ticker = None;
        }

        info!(enabled, period_secs = self.period.as_secs(), "Autoplay toggled");
        self.bus.publish(ReplayEvent::AutoplayToggled {
            metadata: EventMetadata::new(SOURCE),
            enabled,
        });
        true
    }

    fn spawn_ticker(&self) -> tokio::task::JoinHandle<()> {
        let requests = self.requests.clone();
        let period = self.period;
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately.
            interval.tick().await;
            loop {
                interval.tick().await;
                let Some(sender) = requests.upgrade() else {
                    break;
                };
                debug!("Autoplay tick");
                if sender.send(RunRequest::Advance).await.is_err() {
                    break;
                }
            }
            debug!("Autoplay timer stopped");
        })
    }
}

impl std::fmt::Debug for AutoplayScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AutoplayScheduler")
            .field("period", &self.period)
            .field("enabled", &self.is_enabled())
            .finish_non_exhaustive()
    }
}
