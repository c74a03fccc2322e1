//! HTTP surface for the dashboard.
//!
//! Exposes a single route:
//!
//! - `GET /api/aircraft`: the current [`NormalizedSnapshot`] for the configured
//!   feeder host, as JSON.
//!
//! The cache lookup runs on its own task so that a panic anywhere in the
//! refresh path turns into `500 {"error": "..."}` instead of a dropped
//! connection.

use crate::cache::{AircraftCache, Clock, SystemClock};
use crate::feeder::AircraftSource;
use crate::NormalizedSnapshot;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use std::io;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};

/// Shared state behind the router.
pub struct AppState<S, C = SystemClock> {
    pub cache: AircraftCache<S, C>,
    /// Feeder host every request is served for
    pub host: String,
}

impl<S: AircraftSource, C: Clock> AppState<S, C> {
    pub fn new(cache: AircraftCache<S, C>, host: impl Into<String>) -> Self {
        AppState {
            cache,
            host: host.into(),
        }
    }

    /// Current snapshot, with any panic in the refresh caught at this boundary.
    pub async fn aircraft_data(self: Arc<Self>) -> Result<NormalizedSnapshot, String>
    where
        S: 'static,
        C: 'static,
    {
        tokio::spawn(async move { self.cache.get(&self.host).await })
            .await
            .map_err(|e| e.to_string())
    }
}

/// Router serving `/api/aircraft` from `state`.
pub fn router<S, C>(state: Arc<AppState<S, C>>) -> Router
where
    S: AircraftSource + 'static,
    C: Clock + 'static,
{
    Router::new()
        .route("/api/aircraft", get(aircraft_handler::<S, C>))
        .with_state(state)
}

/// Bind `addr` and serve the dashboard API until the process is stopped.
pub async fn serve<S, C>(addr: &str, state: Arc<AppState<S, C>>) -> io::Result<()>
where
    S: AircraftSource + 'static,
    C: Clock + 'static,
{
    let listener = TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, host = %state.host, "dashboard API listening");
    axum::serve(listener, router(state)).await
}

async fn aircraft_handler<S, C>(State(state): State<Arc<AppState<S, C>>>) -> Response
where
    S: AircraftSource + 'static,
    C: Clock + 'static,
{
    match state.aircraft_data().await {
        Ok(snapshot) => Json(snapshot).into_response(),
        Err(message) => {
            error!(error = %message, "aircraft data request failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": message })),
            )
                .into_response()
        }
    }
}
