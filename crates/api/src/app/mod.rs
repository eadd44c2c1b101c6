//! HTTP API application wiring (Axum router over the warehouse engine).
//!
//! - `routes/`: HTTP routes + handlers (one file per area)
//! - `dto.rs`: request bodies and query strings
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{Extension, Router, routing::get};
use tower::ServiceBuilder;

use depot_infra::WarehouseEngine;

pub mod dto;
pub mod errors;
pub mod routes;

/// Shared engine handle injected into every handler.
pub type Engine = Arc<WarehouseEngine>;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub fn build_app(engine: Engine) -> Router {
    Router::new()
        .route("/health", get(routes::system::health))
        .nest("/warehouse", routes::warehouse::router().merge(routes::catalog::router()))
        .nest("/feed", routes::feed::router())
        .layer(ServiceBuilder::new().layer(Extension(engine)))
}
