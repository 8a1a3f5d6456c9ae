//! ==============================================================================
//! config.rs - runtime configuration loader
//! ==============================================================================
//!
//! purpose:
//!     defines the schema for `dashboard.toml`.
//!     loads configuration from file or falls back to defaults.
//!
//! structure:
//!     - SimulationConfig: dashboard variant, refresh rate, optional rng seed.
//!     - ServerConfig: where the json bridge listens.
//!     - LoggingConfig: log level and whether every reading is logged.
//!
//! every section is optional; missing keys take the defaults below.
//!
//! ==============================================================================

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;
use tracing::{info, warn};

use crate::domain::Variant;
use crate::scheduler::{self, DEFAULT_INTERVAL_MS};

/// Root configuration structure
#[derive(Debug, Deserialize, Clone, Default)]
pub struct DashboardConfig {
    #[serde(default)]
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SimulationConfig {
    pub variant: Variant,
    pub refresh_rate_ms: u64,
    /// fixed seed for reproducible runs; os entropy when absent
    pub rng_seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            variant: Variant::default(),
            refresh_rate_ms: DEFAULT_INTERVAL_MS,
            rng_seed: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind: "0.0.0.0:3000".to_string() }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub show_sensor_data: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), show_sensor_data: true }
    }
}

/// where the active configuration came from
#[derive(Debug)]
pub enum ConfigSource {
    File(PathBuf),
    /// a config file exists but could not be used
    Fallback { path: PathBuf, error: anyhow::Error },
    Defaults,
}

impl ConfigSource {
    /// report the source; call once logging is up
    pub fn log(&self) {
        match self {
            ConfigSource::File(path) => info!("[CONFIG] Loaded from {}", path.display()),
            ConfigSource::Fallback { path, error } => {
                warn!("[CONFIG] Failed to load {}: {:#} - using defaults", path.display(), error)
            }
            ConfigSource::Defaults => warn!("[CONFIG] No config file found - using defaults"),
        }
    }
}

impl DashboardConfig {
    /// Load configuration from file
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> anyhow::Result<Self> {
        toml::from_str(content).context("failed to parse config")
    }

    /// Load with default fallback
    ///
    /// logging is usually not initialised yet (its level lives in this file),
    /// so the outcome is returned rather than logged.
    pub fn load_or_default() -> (Self, ConfigSource) {
        let paths = [
            PathBuf::from("config").join("dashboard.toml"),
            PathBuf::from("..").join("config").join("dashboard.toml"),
        ];

        for path in paths {
            if path.exists() {
                return match Self::load(&path) {
                    Ok(config) => (config, ConfigSource::File(path)),
                    Err(error) => (Self::default(), ConfigSource::Fallback { path, error }),
                };
            }
        }

        (Self::default(), ConfigSource::Defaults)
    }

    /// configured refresh period, or the 3s default when the configured
    /// value is not offered by the selected variant
    pub fn refresh_interval(&self) -> Duration {
        let ms = self.simulation.refresh_rate_ms;
        let allowed = self.simulation.variant.has_controls() || ms == DEFAULT_INTERVAL_MS;
        match scheduler::refresh_rate(ms) {
            Ok(interval) if allowed => interval,
            Ok(_) => {
                warn!(
                    refresh_rate_ms = ms,
                    "basic dashboard refreshes every {} ms",
                    DEFAULT_INTERVAL_MS
                );
                Duration::from_millis(DEFAULT_INTERVAL_MS)
            }
            Err(e) => {
                warn!("{:#} - falling back to {} ms", e, DEFAULT_INTERVAL_MS);
                Duration::from_millis(DEFAULT_INTERVAL_MS)
            }
        }
    }

    /// Log configuration summary
    pub fn log_summary(&self) {
        info!(
            variant = ?self.simulation.variant,
            refresh_rate_ms = self.simulation.refresh_rate_ms,
            seeded = self.simulation.rng_seed.is_some(),
            bind = %self.server.bind,
            log_level = %self.logging.level,
            show_sensor_data = self.logging.show_sensor_data,
            "dashboard configuration"
        );
    }
}
