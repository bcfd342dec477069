//! Periodic tick source.
//!
//! A cancellable tokio task that invokes a callback once per period. It
//! knows nothing about sessions: the callback decides whether another tick
//! is wanted.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::debug;

/// What the tick callback wants the driver to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickFlow {
    Continue,
    Finish,
}

#[derive(Debug)]
pub struct TickDriver {
    period: Duration,
    handle: Option<JoinHandle<()>>,
}

impl TickDriver {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            handle: None,
        }
    }

    /// True while the periodic task is alive.
    pub fn is_active(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Spawn the periodic task. No-op if one is already active.
    ///
    /// The first tick fires one full period after this call. A tick is never
    /// issued before the previous callback has returned, and wall-clock time
    /// lost while the host was suspended produces a single late tick rather
    /// than a burst.
    pub fn start<F, Fut>(&mut self, mut on_tick: F)
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = TickFlow> + Send + 'static,
    {
        if self.is_active() {
            debug!("tick driver already active");
            return;
        }

        let period = self.period;
        let handle = tokio::spawn(async move {
            let mut interval = time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if on_tick().await == TickFlow::Finish {
                    debug!("tick driver finished");
                    break;
                }
            }
        });
        self.handle = Some(handle);
        debug!(period_ms = period.as_millis() as u64, "tick driver started");
    }

    /// Cancel the pending tick. No-op if inactive.
    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            if !handle.is_finished() {
                debug!("tick driver stopped");
            }
            handle.abort();
        }
    }
}

impl Drop for TickDriver {
    fn drop(&mut self) {
        self.stop();
    }
}
