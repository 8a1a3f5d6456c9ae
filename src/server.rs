//! ==============================================================================
//! server.rs - json bridge to the browser dashboard
//! ==============================================================================
//!
//! purpose:
//!     exposes the dashboard view and the presentation callbacks over http so
//!     a browser front end can render them. no html is produced here.
//!
//! routes:
//!     GET  /api                    -> current DashboardView
//!     GET  /api/history?metric=x   -> chart series (selected metric if omitted)
//!     POST /api/toggle             -> pause / resume the simulation
//!     POST /api/refresh-rate?ms=n  -> change the refresh period
//!     POST /api/metric?name=x      -> select the charted metric
//!     POST /api/water              -> water the plant
//!
//! ==============================================================================

use anyhow::{Context, Result};
use axum::{
    extract::{rejection::QueryRejection, Query, State},
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::dashboard::Dashboard;
use crate::domain::{DashboardView, Metric};

pub fn router(dashboard: Dashboard) -> Router {
    Router::new()
        .route("/api", get(api_handler))
        .route("/api/history", get(history_handler))
        .route("/api/toggle", post(toggle_handler))
        .route("/api/refresh-rate", post(refresh_rate_handler))
        .route("/api/metric", post(metric_handler))
        .route("/api/water", post(water_handler))
        .layer(CorsLayer::permissive())
        .with_state(dashboard)
}

pub async fn run_server(dashboard: Dashboard, bind: &str) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("failed to bind {}", bind))?;
    info!("dashboard api live at http://{}/api", bind);
    axum::serve(listener, router(dashboard)).await?;
    Ok(())
}

/// current view as json.
///
/// handlers taking query parameters accept the extractor's rejection and
/// answer it with the same `{"status":"error"}` body as any other bad input.
async fn api_handler(State(dashboard): State<Dashboard>) -> Json<DashboardView> {
    Json(dashboard.view().await)
}

#[derive(Deserialize)]
struct HistoryParams {
    metric: Option<String>,
}

async fn history_handler(
    State(dashboard): State<Dashboard>,
    params: Result<Query<HistoryParams>, QueryRejection>,
) -> Json<Value> {
    let Query(params) = match params {
        Ok(params) => params,
        Err(rejection) => return error(rejection.into()),
    };
    let metric = match params.metric {
        Some(name) => match name.parse::<Metric>() {
            Ok(metric) => metric,
            Err(e) => return error(e),
        },
        None => dashboard.selected_metric().await,
    };
    let points = dashboard.series(metric).await;
    Json(json!({"metric": metric, "points": points}))
}

async fn toggle_handler(State(dashboard): State<Dashboard>) -> Json<Value> {
    let state = dashboard.toggle_simulation().await;
    Json(json!({"status": "ok", "state": state}))
}

#[derive(Deserialize)]
struct RefreshRateParams {
    ms: u64,
}

async fn refresh_rate_handler(
    State(dashboard): State<Dashboard>,
    params: Result<Query<RefreshRateParams>, QueryRejection>,
) -> Json<Value> {
    let Query(params) = match params {
        Ok(params) => params,
        Err(rejection) => return error(rejection.into()),
    };
    match dashboard.set_refresh_rate(params.ms).await {
        Ok(()) => Json(json!({"status": "ok", "intervalMs": params.ms})),
        Err(e) => error(e),
    }
}

#[derive(Deserialize)]
struct MetricParams {
    name: String,
}

async fn metric_handler(
    State(dashboard): State<Dashboard>,
    params: Result<Query<MetricParams>, QueryRejection>,
) -> Json<Value> {
    let Query(params) = match params {
        Ok(params) => params,
        Err(rejection) => return error(rejection.into()),
    };
    match dashboard.select_metric(&params.name).await {
        Ok(metric) => Json(json!({"status": "ok", "metric": metric})),
        Err(e) => error(e),
    }
}

async fn water_handler(State(dashboard): State<Dashboard>) -> Json<Value> {
    match dashboard.water_plant().await {
        Ok(()) => Json(json!({"status": "ok", "action": "water"})),
        Err(e) => error(e),
    }
}

fn error(e: anyhow::Error) -> Json<Value> {
    Json(json!({"status": "error", "message": format!("{:#}", e)}))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Variant;
    use crate::feedback::WATERED;
    use crate::generator::ReadingGenerator;
    use crate::history::SEED_COUNT;
    use crate::scheduler::DEFAULT_INTERVAL_MS;
    use crate::session::DashboardSession;
    use axum::http::Uri;
    use serde::de::DeserializeOwned;
    use std::time::Duration;

    fn dashboard(variant: Variant) -> Dashboard {
        let session = DashboardSession::new(
            ReadingGenerator::seeded(21, variant),
            Duration::from_millis(DEFAULT_INTERVAL_MS),
            chrono::Utc::now().naive_utc(),
        );
        Dashboard::new(session)
    }

    /// run the query extractor on a request path the way the router would
    fn query<T: DeserializeOwned>(path: &str) -> Result<Query<T>, QueryRejection> {
        Query::try_from_uri(&path.parse::<Uri>().unwrap())
    }

    #[tokio::test]
    async fn api_returns_the_view() {
        let d = dashboard(Variant::Extended);
        let Json(view) = api_handler(State(d)).await;
        assert_eq!(view.history.len(), SEED_COUNT);
        assert_eq!(view.scheduler.interval_ms, DEFAULT_INTERVAL_MS);
    }

    #[tokio::test]
    async fn toggle_reports_new_state() {
        let d = dashboard(Variant::Extended);
        let Json(body) = toggle_handler(State(d.clone())).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["state"], "paused");
        let Json(body) = toggle_handler(State(d)).await;
        assert_eq!(body["state"], "running");
    }

    #[tokio::test]
    async fn refresh_rate_errors_are_reported() {
        let d = dashboard(Variant::Extended);
        let Json(body) =
            refresh_rate_handler(State(d.clone()), query("/api/refresh-rate?ms=7")).await;
        assert_eq!(body["status"], "error");

        let Json(body) =
            refresh_rate_handler(State(d.clone()), query("/api/refresh-rate?ms=1000")).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(d.view().await.scheduler.interval_ms, 1000);
    }

    #[tokio::test]
    async fn malformed_query_gets_json_error() {
        let d = dashboard(Variant::Extended);
        for path in ["/api/refresh-rate?ms=fast", "/api/refresh-rate"] {
            let Json(body) = refresh_rate_handler(State(d.clone()), query(path)).await;
            assert_eq!(body["status"], "error", "{}", path);
            assert!(body["message"].as_str().is_some_and(|m| !m.is_empty()));
        }
        assert_eq!(d.view().await.scheduler.interval_ms, DEFAULT_INTERVAL_MS);

        let Json(body) = metric_handler(State(d.clone()), query("/api/metric")).await;
        assert_eq!(body["status"], "error");
        assert_eq!(d.selected_metric().await, Metric::Temperature);
    }

    #[tokio::test]
    async fn history_defaults_to_selected_metric() {
        let d = dashboard(Variant::Extended);
        let Json(body) = metric_handler(State(d.clone()), query("/api/metric?name=humidity")).await;
        assert_eq!(body["metric"], "humidity");

        let Json(body) = history_handler(State(d.clone()), query("/api/history")).await;
        assert_eq!(body["metric"], "humidity");
        assert_eq!(body["points"].as_array().unwrap().len(), SEED_COUNT);

        let Json(body) = history_handler(State(d), query("/api/history?metric=nope")).await;
        assert_eq!(body["status"], "error");
    }

    #[tokio::test]
    async fn water_route() {
        let d = dashboard(Variant::Extended);
        let Json(body) = water_handler(State(d.clone())).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(d.view().await.feedback, vec![WATERED.to_string()]);

        let basic = dashboard(Variant::Basic);
        let Json(body) = water_handler(State(basic)).await;
        assert_eq!(body["status"], "error");
    }

    #[test]
    fn router_builds() {
        let _ = router(dashboard(Variant::Basic));
    }
}
