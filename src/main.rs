//! ==============================================================================
//! main.rs - plant monitor entry point
//! ==============================================================================
//!
//! purpose:
//!     runs one simulated dashboard session and serves it to the browser.
//!
//! responsibilities:
//!     - load dashboard.toml (or defaults) and initialise logging
//!     - create the session and arm the simulation timer
//!     - serve the json bridge until ctrl-c
//!     - tear the session down so no timer outlives it
//!
//! architecture:
//!
//!     ┌───────────────────────────────────────────────────────┐
//!     │                  rust host (this file)                │
//!     │  ┌──────────────────┐        ┌──────────────────────┐ │
//!     │  │ simulation timer │        │ web server           │ │
//!     │  │ (1-10s cycle)    │        │ (json bridge)        │ │
//!     │  └────────┬─────────┘        └──────────┬───────────┘ │
//!     │           └──────────────┬──────────────┘             │
//!     │                    ┌─────┴─────┐                      │
//!     │                    │ dashboard │ <- dashboard.rs      │
//!     │                    └─────┬─────┘                      │
//!     │        (clone-able handle to one locked session)      │
//!     └──────────────────────────┼────────────────────────────┘
//!                                │ DashboardView (json)
//!                                ▼
//!                      browser presentation layer
//!
//! ==============================================================================

use anyhow::Result;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use plant_monitor::config::DashboardConfig;
use plant_monitor::server;
use plant_monitor::Dashboard;

#[tokio::main]
async fn main() -> Result<()> {
    // step 1: load configuration, then logging (its level comes from the file)
    let (config, source) = DashboardConfig::load_or_default();
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("===========================================================");
    info!("  Plant Monitor - simulated environment dashboard");
    info!("===========================================================");
    source.log();
    config.log_summary();

    // step 2: create the session and start the simulation
    let dashboard = Dashboard::from_config(&config);
    dashboard.start().await;

    // step 3: serve until the server dies or ctrl-c
    let outcome = tokio::select! {
        result = server::run_server(dashboard.clone(), &config.server.bind) => result,
        _ = tokio::signal::ctrl_c() => {
            info!("shutdown requested");
            Ok(())
        }
    };

    // step 4: teardown - cancel the timer before exiting
    dashboard.shutdown().await;

    if let Err(e) = &outcome {
        error!("web server error: {:#}", e);
    }
    outcome
}
