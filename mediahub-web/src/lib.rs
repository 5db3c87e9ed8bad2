//! mediahub-web
//!
//! HTTP API and background schedule-download worker for the mediahub
//! conference media backend.

pub mod api;
pub mod downloader;
pub mod error;
pub mod state;

use std::sync::Arc;

use axum::routing::{get, post, put};
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::state::AppState;

/// Build the Axum router with all routes
pub fn build_router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        .route("/health", get(api::health))
        .route(
            "/conferences",
            get(api::list_conferences).post(api::create_conference),
        )
        .route(
            "/conferences/{id}",
            get(api::get_conference).delete(api::delete_conference),
        )
        .route("/conferences/{id}/schedule", put(api::update_schedule))
        .route(
            "/conferences/{id}/finish-download",
            post(api::finish_download),
        )
        .route(
            "/conferences/{id}/events",
            get(api::list_events).post(api::create_event),
        )
        .route("/tags/{tag}", get(api::show_tag));

    Router::new()
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive())
        .with_state(state)
}
