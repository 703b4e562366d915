//! Local development proxy for the EcoleDirecte API.
//!
//! Requests under `/api/` are re-encoded as form data and relayed to the
//! upstream API; every other path is served from a static directory. All
//! responses carry `Access-Control-Allow-Origin: *` so a page served from one
//! local origin can talk to the API through this server.

use axum::{middleware::from_fn, routing::get, Router};
use std::sync::Arc;
use tower_http::{services::ServeDir, trace::TraceLayer};

pub mod config;
pub mod cors;
pub mod error;
pub mod handlers;
pub mod proxy;

use crate::{config::AppConfig, error::AppError, proxy::UpstreamClient};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub upstream: UpstreamClient,
}

impl AppState {
    pub fn new(config: AppConfig) -> Result<Self, AppError> {
        let upstream = UpstreamClient::new(&config)?;
        Ok(Self {
            config: Arc::new(config),
            upstream,
        })
    }
}

/// Builds the whole HTTP surface: proxy routes, static fallback, preflight
/// handling and the CORS header.
pub fn build_router(state: AppState) -> Router {
    let proxy = get(handlers::proxy_request).post(handlers::proxy_request);
    let static_files = ServeDir::new(&state.config.static_root);

    Router::new()
        .route("/api/", proxy.clone())
        .route("/api/*path", proxy)
        .fallback_service(static_files)
        .with_state(state)
        .layer(from_fn(cors::preflight))
        .layer(TraceLayer::new_for_http())
        .layer(cors::allow_origin_layer())
}
