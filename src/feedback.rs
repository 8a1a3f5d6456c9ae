//! ==============================================================================
//! feedback.rs - threshold advisories for one reading
//! ==============================================================================
//!
//! purpose:
//!     turns the newest reading into the list of messages shown under the
//!     charts. each metric contributes at most one advisory, in a fixed
//!     order. the result depends on the reading alone, never on history.
//!
//! relationships:
//!     - uses: thresholds.rs (warning / min / max per metric)
//!     - used by: session.rs (tick replaces the feedback list, watering
//!       swaps in WATERED)
//!
//! ==============================================================================

use crate::domain::Reading;
use crate::thresholds::{AIR_QUALITY, HUMIDITY, PLANT_HEALTH, SOIL_MOISTURE, TEMPERATURE};

/// returned when no metric needs attention
pub const ALL_CLEAR: &str = "All parameters look good!";

/// replaces the feedback list after a watering action
pub const WATERED: &str = "Plant watered successfully! Soil moisture has been increased.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advisory {
    PoorAirQuality,
    LowLight,
    HighTemperature,
    LowTemperature,
    HighHumidity,
    LowHumidity,
    UnderWatered,
    OverWatered,
    DecliningHealth,
}

impl Advisory {
    pub fn message(self) -> &'static str {
        match self {
            Advisory::PoorAirQuality => "Air quality is poor. Consider ventilation.",
            Advisory::LowLight => {
                "Low light conditions detected. Make sure your plant receives adequate light during the day."
            }
            Advisory::HighTemperature => "Temperature is high. Consider cooling the environment.",
            Advisory::LowTemperature => "Temperature is low. Consider warming the environment.",
            Advisory::HighHumidity => "Humidity is high. Consider dehumidification.",
            Advisory::LowHumidity => "Humidity is low. Consider using a humidifier.",
            Advisory::UnderWatered => "Soil moisture is low. Your plant may need watering.",
            Advisory::OverWatered => {
                "Soil moisture is high. Avoid watering until soil dries a bit."
            }
            Advisory::DecliningHealth => {
                "Plant health is declining. Review light, water and temperature conditions."
            }
        }
    }
}

/// advisories raised by `reading`, in priority order. empty means all clear.
pub fn advisories(reading: &Reading) -> Vec<Advisory> {
    let mut out = Vec::new();

    if f64::from(reading.air_quality) > AIR_QUALITY.warning {
        out.push(Advisory::PoorAirQuality);
    }

    if reading.is_dark() {
        out.push(Advisory::LowLight);
    }

    if reading.temperature > TEMPERATURE.warning {
        out.push(Advisory::HighTemperature);
    } else if reading.temperature < TEMPERATURE.min {
        out.push(Advisory::LowTemperature);
    }

    if reading.humidity > HUMIDITY.warning {
        out.push(Advisory::HighHumidity);
    } else if reading.humidity < HUMIDITY.min {
        out.push(Advisory::LowHumidity);
    }

    let soil = f64::from(reading.soil_moisture);
    if soil < SOIL_MOISTURE.warning {
        out.push(Advisory::UnderWatered);
    } else if soil > SOIL_MOISTURE.max {
        out.push(Advisory::OverWatered);
    }

    if let Some(health) = reading.plant_health {
        if f64::from(health) < PLANT_HEALTH.warning {
            out.push(Advisory::DecliningHealth);
        }
    }

    out
}

/// feedback list for `reading`; never empty
pub fn evaluate(reading: &Reading) -> Vec<String> {
    let found = advisories(reading);
    if found.is_empty() {
        return vec![ALL_CLEAR.to_string()];
    }
    found.into_iter().map(|a| a.message().to_string()).collect()
}
