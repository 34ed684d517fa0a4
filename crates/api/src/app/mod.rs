//! HTTP API application wiring (Axum router + engine wiring).
//!
//! - `services.rs`: builds the shared authorization engine
//! - `routes/`: HTTP routes + handlers
//! - `dto.rs`: request/response DTOs and mapping to engine types
//! - `errors.rs`: consistent error responses

use axum::{Extension, Router, routing::get};
use tower::ServiceBuilder;

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

pub use services::SharedEngine;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub fn build_app(engine: SharedEngine, auth_state: middleware::AuthState) -> Router {
    // Protected routes: require a credential.
    let protected = routes::router()
        .layer(Extension(engine))
        .layer(axum::middleware::from_fn_with_state(
            auth_state,
            middleware::credential_middleware,
        ));

    Router::new()
        .route("/health", get(routes::system::health))
        .merge(protected)
        .layer(ServiceBuilder::new())
}
