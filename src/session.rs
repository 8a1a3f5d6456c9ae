//! ==============================================================================
//! session.rs - the dashboard session context
//! ==============================================================================
//!
//! purpose:
//!     owns everything one dashboard session mutates: the reading generator,
//!     the history window, the feedback list, the scheduler state and the
//!     last-watered date. nothing here is global.
//!
//! design:
//!     synchronous and clock-injected (`now`/`today` are passed in) so every
//!     operation is deterministic under test. timers live in dashboard.rs,
//!     which serializes all access to a session behind one lock.
//!
//! relationships:
//!     - uses: generator.rs, history.rs, feedback.rs, scheduler.rs, thresholds.rs
//!     - used by: dashboard.rs
//!
//! ==============================================================================

use std::time::Duration;

use anyhow::{bail, Result};
use chrono::{NaiveDate, NaiveDateTime};
use rand::rngs::StdRng;
use rand::Rng;

use crate::domain::{DashboardView, Metric, MetricStatus, Reading, SchedulerView, Variant};
use crate::feedback::{self, WATERED};
use crate::generator::ReadingGenerator;
use crate::history::{HistoryWindow, SEED_COUNT};
use crate::scheduler::{self, Scheduler, SchedulerState, DEFAULT_INTERVAL_MS};
use crate::thresholds::{self, HealthStatus};

/// soil moisture added by one watering
pub const WATER_BOOST: u32 = 200;

/// watering never pushes soil moisture past this
pub const SOIL_MOISTURE_CEILING: u32 = 1200;

pub struct DashboardSession<R = StdRng> {
    generator: ReadingGenerator<R>,
    history: HistoryWindow,
    feedback: Vec<String>,
    scheduler: Scheduler,
    last_watered: Option<NaiveDate>,
    generated: u64,
}

impl<R: Rng> DashboardSession<R> {
    /// new running session with a seeded history window
    ///
    /// the feedback list stays empty until the first tick or action.
    pub fn new(mut generator: ReadingGenerator<R>, interval: Duration, now: NaiveDateTime) -> Self {
        let history = HistoryWindow::seed(&mut generator, SEED_COUNT, now);
        Self {
            generator,
            history,
            feedback: Vec::new(),
            scheduler: Scheduler::new(interval),
            last_watered: None,
            generated: 0,
        }
    }

    pub fn variant(&self) -> Variant {
        self.generator.variant()
    }

    pub fn history(&self) -> &HistoryWindow {
        &self.history
    }

    pub fn latest(&self) -> Option<&Reading> {
        self.history.latest()
    }

    pub fn feedback(&self) -> &[String] {
        &self.feedback
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn last_watered(&self) -> Option<NaiveDate> {
        self.last_watered
    }

    /// readings produced by ticks (seed readings excluded)
    pub fn generated(&self) -> u64 {
        self.generated
    }

    /// one scheduler cycle: generate, append, re-evaluate
    ///
    /// the feedback list is replaced, not merged.
    pub fn tick(&mut self, now: NaiveDateTime) -> Reading {
        let reading = self.generator.generate_at(now);
        self.feedback = feedback::evaluate(&reading);
        self.history.append(reading.clone());
        self.generated += 1;
        reading
    }

    /// timer entry point. a firing armed under a stale epoch, or arriving
    /// while paused, is dropped without touching the session.
    pub fn fire(&mut self, epoch: u64, now: NaiveDateTime) -> Option<Reading> {
        if !self.scheduler.is_current(epoch) {
            return None;
        }
        Some(self.tick(now))
    }

    pub fn toggle(&mut self) -> SchedulerState {
        self.scheduler.toggle()
    }

    /// returns true when the running timer must be re-armed
    pub fn set_refresh_rate(&mut self, ms: u64) -> Result<bool> {
        if !self.variant().has_controls() && ms != DEFAULT_INTERVAL_MS {
            bail!("refresh rate is fixed at {} ms on the basic dashboard", DEFAULT_INTERVAL_MS);
        }
        let interval = scheduler::refresh_rate(ms)?;
        Ok(self.scheduler.set_interval(interval))
    }

    /// raise soil moisture on the latest reading (capped), remember the date
    /// and replace the feedback list with a confirmation
    pub fn water_plant(&mut self, today: NaiveDate) -> Result<()> {
        if !self.variant().has_controls() {
            bail!("watering is not available on the basic dashboard");
        }
        self.history.mutate_latest(|mut reading| {
            let boosted = reading.soil_moisture.saturating_add(WATER_BOOST);
            reading.soil_moisture = boosted.min(SOIL_MOISTURE_CEILING);
            reading
        });
        self.last_watered = Some(today);
        self.feedback = vec![WATERED.to_string()];
        Ok(())
    }

    /// teardown. the scheduler never runs again after this.
    pub fn stop(&mut self) {
        self.scheduler.stop();
    }

    pub fn view(&self, selected_metric: Metric) -> DashboardView {
        let latest = self.history.latest();
        DashboardView {
            variant: self.variant(),
            history: self.history.to_vec(),
            feedback: self.feedback.clone(),
            scheduler: SchedulerView {
                state: self.scheduler.state(),
                interval_ms: self.scheduler.interval().as_millis() as u64,
            },
            last_watered: self.last_watered,
            latest: latest.map(metric_statuses).unwrap_or_default(),
            health_status: latest
                .and_then(|r| r.plant_health)
                .map(HealthStatus::from_score),
            selected_metric,
            total_readings: self.generated,
        }
    }
}

fn metric_statuses(reading: &Reading) -> Vec<MetricStatus> {
    Metric::ALL
        .into_iter()
        .filter_map(|metric| {
            reading.value(metric).map(|value| MetricStatus {
                metric,
                value,
                unit: thresholds::unit(metric),
                status: thresholds::status(metric, value),
                good_range: thresholds::good_range(metric),
            })
        })
        .collect()
}
