pub mod error;
pub mod health;
pub mod organization;

use axum::{Router, routing::get};
pub use error::{ApiError, ErrorResponse};

use crate::AppState;

/// Routes mounted under `/api`.
pub fn get_api_routes() -> Router<AppState> {
    Router::new().route("/v1/organization", get(organization::get_organization))
}
