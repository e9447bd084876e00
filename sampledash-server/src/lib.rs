// Copyright 2025 Sushanth (https://github.com/sushanthpy)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! SampleDash aggregation server
//!
//! Read-only grouped-count endpoints over the sample store, served under
//! `/api/stats`, plus a `/health` probe.

pub mod api;
pub mod config;
pub mod store;

use anyhow::Result;
use axum::{
    http::{HeaderValue, Uri},
    routing::get,
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api::{health_check, stats_routes, ApiError, AppState};
use config::{HttpServerConfig, ServerConfig};
use store::SqliteStatsStore;

/// Build the application router around `state`.
pub fn build_router(state: AppState, server: &HttpServerConfig) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/stats", stats_routes())
        .fallback(not_found)
        .with_state(state)
        .layer(cors_layer(server))
        .layer(TraceLayer::new_for_http())
}

async fn not_found(uri: Uri) -> ApiError {
    ApiError::NotFound(uri.path().to_string())
}

fn cors_layer(server: &HttpServerConfig) -> CorsLayer {
    if !server.enable_cors {
        return CorsLayer::new();
    }

    let cors = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if server.cors_origins.is_empty() {
        tracing::warn!("CORS: Allowing all origins (development mode). Set cors_origins in production!");
        return cors.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = server
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("CORS: Ignoring invalid origin {:?}", origin);
                None
            }
        })
        .collect();
    tracing::info!("CORS: Allowing origins: {:?}", server.cors_origins);
    cors.allow_origin(AllowOrigin::list(origins))
}

pub async fn run_server(config: ServerConfig) -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sampledash_server=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting SampleDash aggregation server");
    tracing::info!("Configuration: {:#?}", config);

    config.validate()?;

    if config.store.init_schema {
        tracing::info!("Initializing schema in {:?}", config.store.database_path);
        SqliteStatsStore::init_schema(&config.store.database_path)?;
    }

    let store = SqliteStatsStore::new(config.store.database_path.clone());
    let state = AppState::new(Arc::new(store));
    let app = build_router(state, &config.server);

    let addr = config.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{}", addr);

    axum::serve(listener, app).await?;
    tracing::info!("HTTP server stopped");

    Ok(())
}
