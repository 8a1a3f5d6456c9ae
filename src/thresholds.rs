//! ==============================================================================
//! thresholds.rs - per-metric threshold table
//! ==============================================================================
//!
//! purpose:
//!     static {min, max, warning, unit} configuration for every metric that has
//!     one (light does not). consulted by the feedback evaluator for textual
//!     advisories and by the status classification used for colouring.
//!
//! note:
//!     status uses min/max only, never warning. a value between warning and
//!     max reads as Normal while still producing a textual advisory.
//!
//! relationships:
//!     - used by: feedback.rs (advisories), session.rs (view statuses)
//!
//! ==============================================================================

use serde::Serialize;

use crate::domain::Metric;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Threshold {
    pub min: f64,
    pub max: f64,
    pub warning: f64,
    pub unit: &'static str,
}

impl Threshold {
    /// min <= warning <= max
    pub fn is_ordered(&self) -> bool {
        self.min <= self.warning && self.warning <= self.max
    }

    pub fn status(&self, value: f64) -> Status {
        if value < self.min {
            Status::Low
        } else if value > self.max {
            Status::High
        } else {
            Status::Normal
        }
    }
}

pub const AIR_QUALITY: Threshold = Threshold {
    min: 0.0,
    max: 50.0,
    warning: 40.0,
    unit: "ppm",
};
pub const TEMPERATURE: Threshold = Threshold {
    min: 18.0,
    max: 30.0,
    warning: 28.0,
    unit: "°C",
};
pub const HUMIDITY: Threshold = Threshold {
    min: 40.0,
    max: 80.0,
    warning: 75.0,
    unit: "%",
};
pub const SOIL_MOISTURE: Threshold = Threshold {
    min: 800.0,
    max: 1200.0,
    warning: 900.0,
    unit: "",
};
pub const PLANT_HEALTH: Threshold = Threshold {
    min: 70.0,
    max: 100.0,
    warning: 80.0,
    unit: "%",
};

// compile-time validation: min <= warning <= max
const _: () = assert!(
    AIR_QUALITY.min <= AIR_QUALITY.warning && AIR_QUALITY.warning <= AIR_QUALITY.max
);
const _: () = assert!(
    TEMPERATURE.min <= TEMPERATURE.warning && TEMPERATURE.warning <= TEMPERATURE.max
);
const _: () = assert!(HUMIDITY.min <= HUMIDITY.warning && HUMIDITY.warning <= HUMIDITY.max);
const _: () = assert!(
    SOIL_MOISTURE.min <= SOIL_MOISTURE.warning && SOIL_MOISTURE.warning <= SOIL_MOISTURE.max
);
const _: () = assert!(
    PLANT_HEALTH.min <= PLANT_HEALTH.warning && PLANT_HEALTH.warning <= PLANT_HEALTH.max
);

/// threshold lookup; light has none
pub fn threshold(metric: Metric) -> Option<Threshold> {
    match metric {
        Metric::AirQuality => Some(AIR_QUALITY),
        Metric::Light => None,
        Metric::Temperature => Some(TEMPERATURE),
        Metric::Humidity => Some(HUMIDITY),
        Metric::SoilMoisture => Some(SOIL_MOISTURE),
        Metric::PlantHealth => Some(PLANT_HEALTH),
    }
}

pub fn unit(metric: Metric) -> &'static str {
    threshold(metric).map(|t| t.unit).unwrap_or("")
}

pub fn status(metric: Metric, value: f64) -> Option<Status> {
    threshold(metric).map(|t| t.status(value))
}

/// "good range" label shown next to a metric, e.g. `0-40 ppm`
///
/// air quality advertises min-warning, everything else min-max.
pub fn good_range(metric: Metric) -> Option<String> {
    let t = threshold(metric)?;
    let upper = match metric {
        Metric::AirQuality => t.warning,
        _ => t.max,
    };
    let range = format!("{}-{}", t.min, upper);
    Some(if t.unit.is_empty() { range } else { format!("{} {}", range, t.unit) })
}

/// min/max classification of a value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Low,
    Normal,
    High,
}

/// coarse label for the plant health index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl HealthStatus {
    pub fn from_score(score: u8) -> Self {
        match score {
            90.. => HealthStatus::Excellent,
            80..=89 => HealthStatus::Good,
            70..=79 => HealthStatus::Fair,
            _ => HealthStatus::Poor,
        }
    }
}
