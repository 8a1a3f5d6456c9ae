//! ==============================================================================
//! generator.rs - simulated sensor readings
//! ==============================================================================
//!
//! purpose:
//!     stands in for the sensor poll. every call produces one independent
//!     reading sampled uniformly from fixed ranges.
//!
//! randomness:
//!     the random source is injected. sessions use `StdRng`, seeded from the
//!     config for reproducible runs or from os entropy otherwise.
//!
//! relationships:
//!     - used by: history.rs (seeding), session.rs (timer ticks)
//!
//! ==============================================================================

use std::ops::Range;

use chrono::{NaiveDateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::domain::{Reading, Variant, LIGHT_BRIGHT, LIGHT_DARK, TIMESTAMP_FORMAT};

pub const AIR_QUALITY_RANGE: Range<u32> = 10..60;
/// temperature in tenths of a degree: 18.0..28.0
pub const TEMPERATURE_TENTHS: Range<u32> = 180..280;
/// humidity in tenths of a percent: 60.0..80.0
pub const HUMIDITY_TENTHS: Range<u32> = 600..800;
pub const SOIL_MOISTURE_RANGE: Range<u32> = 800..1200;
pub const PLANT_HEALTH_RANGE: Range<u8> = 70..100;

pub struct ReadingGenerator<R = StdRng> {
    rng: R,
    variant: Variant,
}

impl ReadingGenerator<StdRng> {
    pub fn seeded(seed: u64, variant: Variant) -> Self {
        Self::new(StdRng::seed_from_u64(seed), variant)
    }

    pub fn from_entropy(variant: Variant) -> Self {
        Self::new(StdRng::from_entropy(), variant)
    }
}

impl<R: Rng> ReadingGenerator<R> {
    pub fn new(rng: R, variant: Variant) -> Self {
        Self { rng, variant }
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    /// reading stamped with the current utc time
    pub fn generate(&mut self) -> Reading {
        self.generate_at(Utc::now().naive_utc())
    }

    pub fn generate_at(&mut self, at: NaiveDateTime) -> Reading {
        let rng = &mut self.rng;

        let air_quality = rng.gen_range(AIR_QUALITY_RANGE);
        let light = if rng.gen_bool(0.5) { LIGHT_DARK } else { LIGHT_BRIGHT };
        let temperature = f64::from(rng.gen_range(TEMPERATURE_TENTHS)) / 10.0;
        let humidity = f64::from(rng.gen_range(HUMIDITY_TENTHS)) / 10.0;
        let soil_moisture = rng.gen_range(SOIL_MOISTURE_RANGE);
        let plant_health = self
            .variant
            .has_plant_health()
            .then(|| rng.gen_range(PLANT_HEALTH_RANGE));

        Reading {
            timestamp: format_timestamp(at),
            air_quality,
            light,
            temperature,
            humidity,
            soil_moisture,
            plant_health,
        }
    }
}

pub fn format_timestamp(at: NaiveDateTime) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}
