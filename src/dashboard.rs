//! ==============================================================================
//! dashboard.rs - async handle around one dashboard session
//! ==============================================================================
//!
//! purpose:
//!     the object the presentation layer talks to. owns the session, the one
//!     outstanding simulation timer and the ui-local chart selection, and
//!     publishes a fresh view on a watch channel after every change.
//!
//! concurrency:
//!     timer firings and user callbacks all go through the same mutex, so
//!     they never interleave. re-arming the timer (toggle, rate change,
//!     shutdown) happens while that lock is held and bumps the scheduler
//!     epoch, so a firing from the old timer that is already waiting on the
//!     lock finds a stale epoch and does nothing.
//!
//!    the timer task only holds a weak reference to the session; dropping
//!    the last handle ends the task on its next tick.
//!
//! relationships:
//!     - uses: session.rs (state), scheduler.rs (RepeatingTask), config.rs
//!     - used by: server.rs (http bridge), main.rs
//!
//! ==============================================================================

use std::ops::ControlFlow;
use std::sync::{Arc, Weak};

use anyhow::Result;
use chrono::Utc;
use tokio::sync::{watch, Mutex};
use tracing::{debug, info, warn};

use crate::config::DashboardConfig;
use crate::domain::{DashboardView, Metric};
use crate::generator::ReadingGenerator;
use crate::history::SeriesPoint;
use crate::scheduler::{RepeatingTask, SchedulerState};
use crate::session::DashboardSession;

/// metric charted until the user picks another one
pub const DEFAULT_METRIC: Metric = Metric::Temperature;

struct Inner {
    session: DashboardSession,
    ticker: Option<RepeatingTask>,
    /// ui-local; never feeds back into the session
    selected: Metric,
}

impl Inner {
    fn view(&self) -> DashboardView {
        self.session.view(self.selected)
    }
}

#[derive(Clone)]
pub struct Dashboard {
    inner: Arc<Mutex<Inner>>,
    updates: Arc<watch::Sender<DashboardView>>,
    log_readings: bool,
}

impl Dashboard {
    /// wrap a session. no timer runs until [`Dashboard::start`].
    pub fn new(session: DashboardSession) -> Self {
        let inner = Inner {
            session,
            ticker: None,
            selected: DEFAULT_METRIC,
        };
        let (updates, _) = watch::channel(inner.view());
        Self {
            inner: Arc::new(Mutex::new(inner)),
            updates: Arc::new(updates),
            log_readings: false,
        }
    }

    pub fn from_config(config: &DashboardConfig) -> Self {
        let variant = config.simulation.variant;
        let generator = match config.simulation.rng_seed {
            Some(seed) => ReadingGenerator::seeded(seed, variant),
            None => ReadingGenerator::from_entropy(variant),
        };
        let session =
            DashboardSession::new(generator, config.refresh_interval(), Utc::now().naive_utc());
        Self::new(session).log_readings(config.logging.show_sensor_data)
    }

    /// log every generated reading at info level
    pub fn log_readings(mut self, enabled: bool) -> Self {
        self.log_readings = enabled;
        self
    }

    /// arm the simulation timer if the session is running and none is armed
    pub async fn start(&self) {
        let mut inner = self.inner.lock().await;
        if inner.ticker.is_none() {
            self.arm(&mut inner);
        }
        let scheduler = inner.session.scheduler();
        info!(
            state = ?scheduler.state(),
            interval_ms = scheduler.interval().as_millis() as u64,
            readings = inner.session.history().len(),
            "dashboard session started"
        );
    }

    /// pause or resume. after shutdown this does nothing and reports
    /// `Stopped`.
    pub async fn toggle_simulation(&self) -> SchedulerState {
        let mut inner = self.inner.lock().await;
        if inner.session.scheduler().is_stopped() {
            warn!("toggle ignored: dashboard session is shut down");
            return SchedulerState::Stopped;
        }
        let state = inner.session.toggle();
        self.arm(&mut inner);
        info!(state = ?state, "simulation toggled");
        self.publish(&inner);
        state
    }

    pub async fn set_refresh_rate(&self, ms: u64) -> Result<()> {
        let mut inner = self.inner.lock().await;
        let rescheduled = match inner.session.set_refresh_rate(ms) {
            Ok(rescheduled) => rescheduled,
            Err(e) => {
                warn!(interval_ms = ms, "refresh rate rejected: {:#}", e);
                return Err(e);
            }
        };
        if rescheduled {
            self.arm(&mut inner);
        }
        info!(interval_ms = ms, rescheduled, "refresh rate changed");
        self.publish(&inner);
        Ok(())
    }

    /// chart selection; does not touch the session
    pub async fn select_metric(&self, name: &str) -> Result<Metric> {
        let metric: Metric = name.parse()?;
        let mut inner = self.inner.lock().await;
        inner.selected = metric;
        debug!(%metric, "chart metric selected");
        self.publish(&inner);
        Ok(metric)
    }

    pub async fn water_plant(&self) -> Result<()> {
        let mut inner = self.inner.lock().await;
        if let Err(e) = inner.session.water_plant(Utc::now().date_naive()) {
            warn!("watering rejected: {:#}", e);
            return Err(e);
        }
        info!(
            soil_moisture = inner.session.latest().map(|r| r.soil_moisture),
            "plant watered"
        );
        self.publish(&inner);
        Ok(())
    }

    pub async fn view(&self) -> DashboardView {
        self.inner.lock().await.view()
    }

    pub async fn series(&self, metric: Metric) -> Vec<SeriesPoint> {
        self.inner.lock().await.session.history().series(metric)
    }

    pub async fn selected_metric(&self) -> Metric {
        self.inner.lock().await.selected
    }

    /// view updates; the receiver always holds the latest view
    pub fn subscribe(&self) -> watch::Receiver<DashboardView> {
        self.updates.subscribe()
    }

    /// teardown: stop the session for good and cancel the timer
    pub async fn shutdown(&self) {
        let mut inner = self.inner.lock().await;
        inner.session.stop();
        if let Some(ticker) = inner.ticker.take() {
            ticker.cancel();
        }
        self.publish(&inner);
        info!("dashboard session stopped");
    }

    /// cancel the current timer and, if running, start a fresh one under the
    /// current epoch. callers hold the session lock.
    fn arm(&self, inner: &mut Inner) {
        if let Some(old) = inner.ticker.take() {
            old.cancel();
        }

        let scheduler = inner.session.scheduler();
        if !scheduler.is_running() {
            return;
        }
        let epoch = scheduler.epoch();
        let period = scheduler.interval();

        let session = Arc::downgrade(&self.inner);
        let updates = self.updates.clone();
        let log_readings = self.log_readings;
        inner.ticker = Some(RepeatingTask::spawn(period, move || {
            let session = session.clone();
            let updates = updates.clone();
            async move { fire(session, &updates, epoch, log_readings).await }
        }));
        debug!(epoch, period_ms = period.as_millis() as u64, "simulation timer armed");
    }

    fn publish(&self, inner: &Inner) {
        self.updates.send_replace(inner.view());
    }
}

async fn fire(
    session: Weak<Mutex<Inner>>,
    updates: &watch::Sender<DashboardView>,
    epoch: u64,
    log_readings: bool,
) -> ControlFlow<()> {
    let Some(session) = session.upgrade() else {
        return ControlFlow::Break(());
    };
    let mut inner = session.lock().await;

    let Some(reading) = inner.session.fire(epoch, Utc::now().naive_utc()) else {
        debug!(epoch, "stale simulation tick dropped");
        return ControlFlow::Break(());
    };

    if log_readings {
        info!(
            air_quality = reading.air_quality,
            light = reading.light,
            temperature = reading.temperature,
            humidity = reading.humidity,
            soil_moisture = reading.soil_moisture,
            plant_health = reading.plant_health,
            "new reading"
        );
    }

    updates.send_replace(inner.view());
    ControlFlow::Continue(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Variant;
    use crate::feedback::WATERED;
    use crate::scheduler::DEFAULT_INTERVAL_MS;
    use std::time::Duration;

    fn dashboard(variant: Variant) -> Dashboard {
        let session = DashboardSession::new(
            ReadingGenerator::seeded(9, variant),
            Duration::from_millis(DEFAULT_INTERVAL_MS),
            Utc::now().naive_utc(),
        );
        Dashboard::new(session)
    }

    #[tokio::test(start_paused = true)]
    async fn start_is_idempotent() {
        let d = dashboard(Variant::Extended);
        d.start().await;
        d.start().await;
        tokio::time::sleep(Duration::from_millis(3500)).await;
        assert_eq!(d.view().await.total_readings, 1, "exactly one timer armed");
    }

    #[tokio::test(start_paused = true)]
    async fn subscribers_see_new_readings() {
        let d = dashboard(Variant::Extended);
        let mut rx = d.subscribe();
        rx.borrow_and_update();
        d.start().await;

        tokio::time::sleep(Duration::from_millis(3100)).await;
        assert!(rx.has_changed().unwrap());
        let view = rx.borrow_and_update().clone();
        assert_eq!(view.total_readings, 1);
        assert!(!view.feedback.is_empty());
    }

    #[tokio::test]
    async fn select_metric_is_ui_local() {
        let d = dashboard(Variant::Extended);
        let before = d.view().await;
        assert_eq!(before.selected_metric, DEFAULT_METRIC);

        assert_eq!(d.select_metric("soilMoisture").await.unwrap(), Metric::SoilMoisture);
        let after = d.view().await;
        assert_eq!(after.selected_metric, Metric::SoilMoisture);
        assert_eq!(after.history, before.history);
        assert_eq!(after.feedback, before.feedback);

        assert!(d.select_metric("pressure").await.is_err());
        assert_eq!(d.selected_metric().await, Metric::SoilMoisture);
    }

    #[tokio::test]
    async fn water_plant_publishes_confirmation() {
        let d = dashboard(Variant::Extended);
        let rx = d.subscribe();
        d.water_plant().await.unwrap();
        let view = rx.borrow().clone();
        assert_eq!(view.feedback, vec![WATERED.to_string()]);
        assert_eq!(view.last_watered, Some(Utc::now().date_naive()));
    }

    #[tokio::test]
    async fn basic_dashboard_rejects_controls() {
        let d = dashboard(Variant::Basic);
        assert!(d.water_plant().await.is_err());
        assert!(d.set_refresh_rate(1000).await.is_err());
        assert!(d.view().await.last_watered.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_stops_the_timer() {
        let d = dashboard(Variant::Extended);
        d.start().await;
        d.shutdown().await;
        tokio::time::sleep(Duration::from_secs(30)).await;
        let view = d.view().await;
        assert_eq!(view.total_readings, 0);
        assert_eq!(view.scheduler.state, SchedulerState::Stopped);
    }
}
