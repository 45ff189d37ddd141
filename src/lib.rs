//! Organization and user provisioning for a multi-tenant cloud platform.
//!
//! On a user's first visit, `ignition` makes sure the user exists in the
//! platform's identity provider and has an organization to work in, creating
//! either when missing.

pub mod auth;
pub mod config;
pub mod identity;
pub mod models;
pub mod observability;
pub mod platform;
pub mod routes;
pub mod services;

use std::sync::Arc;

use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

/// Shared request state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<config::IgnitionConfig>,
    pub services: services::Services,
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/health/live", get(routes::health::liveness))
        .nest("/api", routes::get_api_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
