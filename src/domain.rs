use anyhow::bail;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::scheduler::SchedulerState;
use crate::thresholds::{HealthStatus, Status};

/// light channel value for a well lit plant
pub const LIGHT_BRIGHT: u8 = 0;
/// light channel value for low light
pub const LIGHT_DARK: u8 = 1;

/// reading timestamps: second precision, no timezone suffix
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// one timestamped snapshot of every simulated metric
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reading {
    /// capture time, `YYYY-MM-DD HH:MM:SS` (utc)
    pub timestamp: String,

    /// air quality in ppm
    pub air_quality: u32,

    /// 0 = bright, 1 = dark
    pub light: u8,

    /// temperature in celsius, one decimal
    pub temperature: f64,

    /// relative humidity (%), one decimal
    pub humidity: f64,

    /// raw soil moisture, dimensionless
    pub soil_moisture: u32,

    /// plant health index (0-100 %), extended dashboard only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plant_health: Option<u8>,
}

impl Reading {
    pub fn is_dark(&self) -> bool {
        self.light == LIGHT_DARK
    }

    /// numeric value of a metric, `None` if this reading does not carry it
    pub fn value(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::AirQuality => Some(f64::from(self.air_quality)),
            Metric::Light => Some(f64::from(self.light)),
            Metric::Temperature => Some(self.temperature),
            Metric::Humidity => Some(self.humidity),
            Metric::SoilMoisture => Some(f64::from(self.soil_moisture)),
            Metric::PlantHealth => self.plant_health.map(f64::from),
        }
    }

    pub fn recorded_at(&self) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(&self.timestamp, TIMESTAMP_FORMAT).ok()
    }

    /// time-of-day part of the timestamp (chart axis label)
    pub fn time_label(&self) -> &str {
        self.timestamp
            .split_once(' ')
            .map(|(_, time)| time)
            .unwrap_or(&self.timestamp)
    }
}

/// every metric a reading can carry
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Metric {
    AirQuality,
    Light,
    Temperature,
    Humidity,
    SoilMoisture,
    PlantHealth,
}

impl Metric {
    /// fixed evaluation / display order
    pub const ALL: [Metric; 6] = [
        Metric::AirQuality,
        Metric::Light,
        Metric::Temperature,
        Metric::Humidity,
        Metric::SoilMoisture,
        Metric::PlantHealth,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Metric::AirQuality => "airQuality",
            Metric::Light => "light",
            Metric::Temperature => "temperature",
            Metric::Humidity => "humidity",
            Metric::SoilMoisture => "soilMoisture",
            Metric::PlantHealth => "plantHealth",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Metric::AirQuality => "Air Quality",
            Metric::Light => "Light Condition",
            Metric::Temperature => "Temperature",
            Metric::Humidity => "Humidity",
            Metric::SoilMoisture => "Soil Moisture",
            Metric::PlantHealth => "Plant Health",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Metric {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match Metric::ALL.into_iter().find(|m| m.name() == s) {
            Some(metric) => Ok(metric),
            None => bail!("unknown metric '{}'", s),
        }
    }
}

/// which flavour of the dashboard a session runs
///
/// - basic: five metrics, fixed 3s refresh, no actions
/// - extended: adds plant health, watering and a selectable refresh rate
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    Basic,
    #[default]
    Extended,
}

impl Variant {
    pub fn has_plant_health(self) -> bool {
        matches!(self, Variant::Extended)
    }

    /// watering and refresh-rate control
    pub fn has_controls(self) -> bool {
        matches!(self, Variant::Extended)
    }
}

// ==============================================================================
// observable view
// ==============================================================================
// everything the presentation layer reads. rebuilt and published after every
// timer firing and user action.

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub variant: Variant,
    /// rolling window, oldest first
    pub history: Vec<Reading>,
    /// advisories for the latest reading (or the last action)
    pub feedback: Vec<String>,
    pub scheduler: SchedulerView,
    pub last_watered: Option<NaiveDate>,
    /// per-metric status of the latest reading
    pub latest: Vec<MetricStatus>,
    pub health_status: Option<HealthStatus>,
    pub selected_metric: Metric,
    /// readings generated since the session started (seed excluded)
    pub total_readings: u64,
}

impl DashboardView {
    pub fn latest_reading(&self) -> Option<&Reading> {
        self.history.last()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulerView {
    pub state: SchedulerState,
    pub interval_ms: u64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricStatus {
    pub metric: Metric,
    pub value: f64,
    pub unit: &'static str,
    /// `None` for metrics without a threshold (light)
    pub status: Option<Status>,
    pub good_range: Option<String>,
}
