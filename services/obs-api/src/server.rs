//! HTTP server for the observation service.
//!
//! Provides endpoints for:
//! - `GET /api/obs` - Resolve and return the current observation
//! - `GET /api/health` - Health check with configuration booleans
//! - Everything else - Static UI assets

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::Extension, http::StatusCode, response::IntoResponse, routing::get, Json, Router,
};
use serde::Serialize;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, services::ServeDir, trace::TraceLayer,
};
use tracing::{error, info};

use obs_common::{Observation, Station};

use crate::providers::{self, Source};
use crate::state::AppState;

/// Response body for a resolved observation.
#[derive(Debug, Serialize)]
pub struct ObsResponse {
    pub ok: bool,
    pub data: Observation,
    pub station: Station,
    pub used: Source,
}

/// Response body for a failed observation request.
#[derive(Debug, Serialize)]
pub struct ObsErrorResponse {
    pub ok: bool,
    pub step: String,
    pub error: String,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub env: EnvStatus,
}

/// Which optional configuration the environment supplied.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvStatus {
    pub primary_configured: bool,
    pub user_agent_configured: bool,
}

/// GET /api/obs - Resolve and return the current observation
async fn obs_handler(Extension(state): Extension<Arc<AppState>>) -> impl IntoResponse {
    match providers::current_observation(&state.config, &state.fetch).await {
        Ok(current) => {
            let response = ObsResponse {
                ok: true,
                data: current.data,
                station: current.station,
                used: current.source,
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            error!(step = %e.stage, error = %e.source, "Observation request failed");

            let response = ObsErrorResponse {
                ok: false,
                step: e.stage.as_str().to_string(),
                error: e.source.to_string(),
            };
            (StatusCode::INTERNAL_SERVER_ERROR, Json(response)).into_response()
        }
    }
}

/// GET /api/health - Health check
async fn health_handler(Extension(state): Extension<Arc<AppState>>) -> impl IntoResponse {
    Json(HealthResponse {
        ok: true,
        env: EnvStatus {
            primary_configured: state.config.primary_configured(),
            user_agent_configured: state.config.user_agent_configured,
        },
    })
}

/// Build the HTTP router. Static assets are the fallback so the UI and the
/// API share one listener.
pub fn build_router(state: Arc<AppState>, public_dir: PathBuf) -> Router {
    Router::new()
        .route("/api/obs", get(obs_handler))
        .route("/api/health", get(health_handler))
        .fallback_service(ServeDir::new(public_dir))
        .layer(Extension(state))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
}

/// Start the HTTP server.
pub async fn start_server(
    state: Arc<AppState>,
    addr: SocketAddr,
    public_dir: PathBuf,
) -> anyhow::Result<()> {
    let app = build_router(state, public_dir);

    info!(addr = %addr, "Starting observation HTTP server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
