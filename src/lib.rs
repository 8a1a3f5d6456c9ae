//! ==============================================================================
//! plant-monitor - simulated plant environment dashboard core
//! ==============================================================================
//!
//! purpose:
//!     the state manager behind a plant monitoring dashboard. readings are
//!     simulated, kept in a rolling window of the last 20, checked against a
//!     threshold table, and refreshed on a timer the user can pause or speed up.
//!
//! layout (leaf to root):
//!     - domain.rs      reading / metric / view types
//!     - thresholds.rs  per-metric min, max, warning and unit
//!     - generator.rs   seedable reading generator
//!     - feedback.rs    reading -> advisories
//!     - history.rs     bounded fifo window
//!     - scheduler.rs   running/paused state + repeating timer
//!     - session.rs     the session context owning all of the above
//!     - dashboard.rs   async handle: lock, timer, view updates
//!     - config.rs      dashboard.toml
//!     - server.rs      json bridge for the browser front end
//!
//! ==============================================================================

pub mod config;
pub mod dashboard;
pub mod domain;
pub mod feedback;
pub mod generator;
pub mod history;
pub mod scheduler;
pub mod server;
pub mod session;
pub mod thresholds;

pub use config::DashboardConfig;
pub use dashboard::Dashboard;
pub use domain::{DashboardView, Metric, Reading, Variant};
pub use generator::ReadingGenerator;
pub use history::HistoryWindow;
pub use scheduler::{Scheduler, SchedulerState};
pub use session::DashboardSession;
