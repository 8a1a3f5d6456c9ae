//! ==============================================================================
//! history.rs - rolling window of readings
//! ==============================================================================
//!
//! purpose:
//!     keeps the most recent [`HISTORY_CAPACITY`] readings for the charts.
//!     insertion order is chronological order; the oldest reading is evicted
//!     first.
//!
//! relationships:
//!     - uses: generator.rs (backdated seed readings)
//!     - used by: session.rs (owns the window), dashboard.rs (chart series)
//!
//! ==============================================================================

use std::collections::VecDeque;

use chrono::{Duration, NaiveDateTime};
use rand::Rng;
use serde::Serialize;

use crate::domain::{Metric, Reading};
use crate::generator::ReadingGenerator;

/// readings kept for charting
pub const HISTORY_CAPACITY: usize = 20;

/// readings created when a session starts
pub const SEED_COUNT: usize = 10;

/// spacing between backdated seed readings
pub const SEED_SPACING_MINUTES: i64 = 5;

#[derive(Debug, Clone, Default)]
pub struct HistoryWindow {
    readings: VecDeque<Reading>,
}

impl HistoryWindow {
    pub fn new() -> Self {
        Self {
            readings: VecDeque::with_capacity(HISTORY_CAPACITY + 1),
        }
    }

    /// `count` independent readings stamped `now - 5*i` minutes, `i = count..=1`.
    pub fn seed<R: Rng>(
        generator: &mut ReadingGenerator<R>,
        count: usize,
        now: NaiveDateTime,
    ) -> Self {
        let mut window = Self::new();
        for i in (1..=count as i64).rev() {
            let at = now - Duration::minutes(SEED_SPACING_MINUTES * i);
            window.append(generator.generate_at(at));
        }
        window
    }

    pub fn append(&mut self, reading: Reading) {
        self.readings.push_back(reading);
        while self.readings.len() > HISTORY_CAPACITY {
            self.readings.pop_front();
        }
    }

    pub fn latest(&self) -> Option<&Reading> {
        self.readings.back()
    }

    /// replace the latest reading with `update(copy)`.
    /// returns false and does nothing when the window is empty.
    pub fn mutate_latest<F>(&mut self, update: F) -> bool
    where
        F: FnOnce(Reading) -> Reading,
    {
        match self.readings.back_mut() {
            Some(last) => {
                *last = update(last.clone());
                true
            }
            None => false,
        }
    }

    pub fn readings(&self) -> impl Iterator<Item = &Reading> {
        self.readings.iter()
    }

    pub fn to_vec(&self) -> Vec<Reading> {
        self.readings.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    pub fn clear(&mut self) {
        self.readings.clear();
    }

    /// chart points for one metric, oldest first. readings that do not carry
    /// the metric are skipped.
    pub fn series(&self, metric: Metric) -> Vec<SeriesPoint> {
        self.readings
            .iter()
            .filter_map(|r| {
                r.value(metric).map(|value| SeriesPoint {
                    timestamp: r.timestamp.clone(),
                    time: r.time_label().to_string(),
                    value,
                })
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub timestamp: String,
    /// `HH:MM:SS` axis label
    pub time: String,
    pub value: f64,
}
