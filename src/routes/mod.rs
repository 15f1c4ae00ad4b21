//! API Routes
//! 
//! This module organizes all HTTP endpoints for the application:
//! - `/summary/test/` - Backend liveness acknowledgement
//! - `/upload/` - CSV upload and summary
//! - `/summaries/` - Recent upload history
//!
//! Every route is also served under `/api`, the prefix the frontend uses.

pub mod health;
pub mod summaries;
pub mod upload;

use axum::extract::DefaultBodyLimit;
use axum::Router;
use tower_http::trace::TraceLayer;
use crate::middleware::apply_cors;
use crate::models::AppState;
use tracing::info;

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
    info!("Creating application router");

    let max_upload_bytes = state.config.upload.max_upload_bytes;
    let allowed_origins = state.config.server.cors_allowed_origins.clone();

    let api_router = Router::new()
        .merge(health::router())
        .merge(upload::router(state.clone()))
        .merge(summaries::router(state));

    let router = Router::new()
        .nest("/api", api_router.clone())
        .merge(api_router)
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http());

    apply_cors(router, &allowed_origins)
}
