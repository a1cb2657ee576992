// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of GridCast.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.
//
// For commercial licensing, please contact: info@solare.cz

//! HTTP layer: axum routes over the object store and the core
//! reshaping logic. All endpoints are read-only JSON.

mod error;
mod handlers;

pub use error::ApiError;

use axum::{Router, routing::get};
use gridcast_store::StoreClient;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;

/// Application state for the request handlers. The store client is
/// constructed once at startup and injected here; handlers never reach
/// for globals.
#[derive(Clone, Debug)]
pub struct AppState {
    pub store: Arc<StoreClient>,
}

/// Build the application router. Split out from [`start_web_server`] so
/// tests can drive it without binding a socket.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::root_handler))
        .route("/health", get(handlers::health_handler))
        .route("/test/s3", get(handlers::store_diagnostics_handler))
        .route(
            "/api/test/actual-demand",
            get(handlers::actual_demand_diagnostics_handler),
        )
        .route("/api/forecast/latest", get(handlers::forecast_latest_handler))
        .route(
            "/api/hourly-data/latest",
            get(handlers::hourly_latest_handler),
        )
        .layer(CorsLayer::permissive()) // Dashboard runs on a separate origin
        .with_state(state)
}

/// Start the web server.
///
/// # Errors
/// Returns error if the server fails to bind or serve
pub async fn start_web_server(
    state: AppState,
    bind_address: &str,
    port: u16,
) -> Result<(), Box<dyn std::error::Error>> {
    let app = build_router(state);

    let addr = format!("{bind_address}:{port}");
    info!("🌐 Starting web server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
