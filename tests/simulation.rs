//! ==============================================================================
//! simulation.rs - timing tests for the simulation timer
//! ==============================================================================
//!
//! purpose:
//!     drives a whole Dashboard through pause, resume, rate changes and
//!     teardown and counts the readings that land.
//!
//! notes:
//!     every test runs on tokio's paused clock. `sleep` jumps virtual time
//!     forward and lets every due timer run first, so firing counts are exact.
//!
//! ==============================================================================

use std::time::Duration;

use chrono::Utc;
use plant_monitor::history::{HISTORY_CAPACITY, SEED_COUNT};
use plant_monitor::scheduler::DEFAULT_INTERVAL_MS;
use plant_monitor::{Dashboard, DashboardSession, ReadingGenerator, SchedulerState, Variant};

fn dashboard() -> Dashboard {
    let session = DashboardSession::new(
        ReadingGenerator::seeded(1234, Variant::Extended),
        Duration::from_millis(DEFAULT_INTERVAL_MS),
        Utc::now().naive_utc(),
    );
    Dashboard::new(session)
}

async fn total(d: &Dashboard) -> u64 {
    d.view().await.total_readings
}

async fn advance_ms(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}

#[tokio::test(start_paused = true)]
async fn runs_at_default_interval() {
    let d = dashboard();
    d.start().await;

    advance_ms(2_900).await;
    assert_eq!(total(&d).await, 0);

    advance_ms(200).await; // t = 3.1s
    assert_eq!(total(&d).await, 1);

    advance_ms(9_000).await; // t = 12.1s
    assert_eq!(total(&d).await, 4);
}

#[tokio::test(start_paused = true)]
async fn window_never_exceeds_capacity() {
    let d = dashboard();
    d.start().await;
    assert_eq!(d.view().await.history.len(), SEED_COUNT);

    advance_ms(DEFAULT_INTERVAL_MS * 25 + 100).await;
    let view = d.view().await;
    assert_eq!(view.total_readings, 25);
    assert_eq!(view.history.len(), HISTORY_CAPACITY);
}

#[tokio::test(start_paused = true)]
async fn pause_stops_appends_and_resume_restarts_them() {
    let d = dashboard();
    d.start().await;
    advance_ms(3_100).await;
    assert_eq!(total(&d).await, 1);

    assert_eq!(d.toggle_simulation().await, SchedulerState::Paused);
    let paused = d.view().await;
    advance_ms(30_000).await;
    let still = d.view().await;
    assert_eq!(still.total_readings, 1);
    assert_eq!(still.history, paused.history);

    // resuming starts a fresh timer: the first firing is a full period away
    assert_eq!(d.toggle_simulation().await, SchedulerState::Running);
    advance_ms(2_900).await;
    assert_eq!(total(&d).await, 1);
    advance_ms(200).await;
    assert_eq!(total(&d).await, 2);
}

#[tokio::test(start_paused = true)]
async fn interval_change_while_running_drops_old_cadence() {
    let d = dashboard();
    d.start().await;

    advance_ms(2_000).await;
    d.set_refresh_rate(10_000).await.unwrap();

    // the old 3s timer would have fired at 3s, 6s and 9s
    advance_ms(9_900).await; // t = 11.9s
    assert_eq!(total(&d).await, 0);

    advance_ms(200).await; // t = 12.1s, first firing of the new timer
    assert_eq!(total(&d).await, 1);

    advance_ms(10_000).await; // t = 22.1s
    assert_eq!(total(&d).await, 2);
}

#[tokio::test(start_paused = true)]
async fn faster_rate_does_not_double_fire() {
    let d = dashboard();
    d.start().await;
    d.set_refresh_rate(1_000).await.unwrap();
    d.set_refresh_rate(1_000).await.unwrap();

    advance_ms(5_500).await;
    assert_eq!(total(&d).await, 5);
    assert_eq!(d.view().await.scheduler.interval_ms, 1_000);
}

#[tokio::test(start_paused = true)]
async fn interval_change_while_paused_applies_on_resume() {
    let d = dashboard();
    d.start().await;
    d.toggle_simulation().await;

    d.set_refresh_rate(5_000).await.unwrap();
    advance_ms(20_000).await;
    assert_eq!(total(&d).await, 0);

    d.toggle_simulation().await;
    advance_ms(4_900).await;
    assert_eq!(total(&d).await, 0);
    advance_ms(200).await;
    assert_eq!(total(&d).await, 1);
}

#[tokio::test(start_paused = true)]
async fn rapid_toggling_leaves_one_timer() {
    let d = dashboard();
    d.start().await;
    for _ in 0..5 {
        d.toggle_simulation().await;
        d.toggle_simulation().await;
    }
    advance_ms(3_100).await;
    assert_eq!(total(&d).await, 1);
}

#[tokio::test(start_paused = true)]
async fn dropping_every_handle_ends_the_timer() {
    let d = dashboard();
    d.start().await;
    let rx = d.subscribe();
    drop(d);

    advance_ms(10_000).await;
    assert_eq!(rx.borrow().total_readings, 0);
}

#[tokio::test(start_paused = true)]
async fn watering_between_ticks_is_overwritten_by_next_tick() {
    let d = dashboard();
    d.start().await;
    d.water_plant().await.unwrap();
    assert_eq!(d.view().await.feedback.len(), 1);

    advance_ms(3_100).await;
    let view = d.view().await;
    assert!(view.last_watered.is_some());
    assert_ne!(view.feedback, vec![plant_monitor::feedback::WATERED.to_string()]);
}

#[tokio::test(start_paused = true)]
async fn shutdown_is_final() {
    let d = dashboard();
    d.start().await;
    d.shutdown().await;

    assert_eq!(d.toggle_simulation().await, SchedulerState::Stopped);
    d.set_refresh_rate(1_000).await.unwrap();
    d.start().await;

    advance_ms(10_100).await;
    let view = d.view().await;
    assert_eq!(view.total_readings, 0);
    assert_eq!(view.scheduler.state, SchedulerState::Stopped);
}
