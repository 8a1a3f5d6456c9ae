//! ==============================================================================
//! scheduler.rs - running/paused state machine and the repeating timer
//! ==============================================================================
//!
//! purpose:
//!     decides WHEN a new reading is generated.
//!
//! structure:
//!     - Scheduler: pure state (running/paused, interval, epoch). no timers.
//!     - RepeatingTask: one tokio task that calls back every period until it
//!       is cancelled or the callback asks to stop.
//!
//! states:
//!     running <-> paused by toggle. stopped is terminal: once a session is
//!     torn down nothing brings its timer back.
//!
//! epochs:
//!     every toggle, interval change and stop bumps the epoch. a timer is
//!     armed with the epoch current at spawn time and its firing is only
//!     honoured while that epoch is still current. the check happens under
//!     the session lock, so once a cancel returns no stale firing can land.
//!
//! relationships:
//!     - used by: session.rs (state), dashboard.rs (arms RepeatingTask)
//!
//! ==============================================================================

use std::future::Future;
use std::ops::ControlFlow;
use std::time::Duration;

use anyhow::{bail, Result};
use serde::Serialize;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

/// default refresh period
pub const DEFAULT_INTERVAL_MS: u64 = 3000;

/// refresh periods offered by the extended dashboard
pub const REFRESH_RATES_MS: [u64; 4] = [1000, 3000, 5000, 10000];

/// accept only the offered refresh periods
pub fn refresh_rate(ms: u64) -> Result<Duration> {
    if !REFRESH_RATES_MS.contains(&ms) {
        bail!(
            "unsupported refresh rate {} ms (expected one of {:?})",
            ms,
            REFRESH_RATES_MS
        );
    }
    Ok(Duration::from_millis(ms))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SchedulerState {
    Running,
    Paused,
    Stopped,
}

#[derive(Clone, Debug)]
pub struct Scheduler {
    state: SchedulerState,
    interval: Duration,
    epoch: u64,
}

impl Scheduler {
    /// starts out running
    pub fn new(interval: Duration) -> Self {
        Self {
            state: SchedulerState::Running,
            interval,
            epoch: 0,
        }
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == SchedulerState::Running
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_stopped(&self) -> bool {
        self.state == SchedulerState::Stopped
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// running -> paused, paused -> running. a stopped scheduler stays stopped.
    pub fn toggle(&mut self) -> SchedulerState {
        self.state = match self.state {
            SchedulerState::Running => SchedulerState::Paused,
            SchedulerState::Paused => SchedulerState::Running,
            SchedulerState::Stopped => return SchedulerState::Stopped,
        };
        self.epoch += 1;
        self.state
    }

    /// store a new interval. returns true when a running timer has to be
    /// rescheduled; while paused the value is only kept for the next resume.
    /// ignored once stopped.
    pub fn set_interval(&mut self, interval: Duration) -> bool {
        if self.is_stopped() {
            return false;
        }
        self.interval = interval;
        if self.is_running() {
            self.epoch += 1;
            true
        } else {
            false
        }
    }

    /// teardown: stop for good and invalidate any armed timer
    pub fn stop(&mut self) {
        self.state = SchedulerState::Stopped;
        self.epoch += 1;
    }

    /// should a timer armed under `epoch` fire now?
    pub fn is_current(&self, epoch: u64) -> bool {
        self.is_running() && self.epoch == epoch
    }
}

// ==============================================================================
// repeating task
// ==============================================================================

/// a cancellable repeating callback
///
/// the first call happens one period after spawn. calls never overlap: the
/// next tick is only awaited after the previous callback has completed.
/// dropping the task cancels it.
pub struct RepeatingTask {
    handle: JoinHandle<()>,
}

impl RepeatingTask {
    pub fn spawn<F, Fut>(period: Duration, mut callback: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ControlFlow<()>> + Send + 'static,
    {
        let start = Instant::now() + period;
        let handle = tokio::spawn(async move {
            let mut ticker = interval_at(start, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if callback().await.is_break() {
                    break;
                }
            }
        });
        Self { handle }
    }

    pub fn cancel(self) {
        self.handle.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for RepeatingTask {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
