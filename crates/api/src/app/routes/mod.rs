use axum::{Router, routing::post};

pub mod authorization;
pub mod system;

/// Router for all authenticated endpoints.
pub fn router() -> Router {
    Router::new().route("/api/v1/authorization/check", post(authorization::check))
}
