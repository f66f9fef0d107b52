pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod store;

use std::sync::Arc;

use axum::{middleware::from_fn, Router};
use tower_http::cors::{Any, CorsLayer};

use db::ConnectionCache;
use store::SharedStore;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<ConnectionCache<SharedStore>>,
}

/// Assembles the application router around the given state.
pub fn app(state: AppState) -> Router {
    Router::new()
        // API routes
        .nest("/api", routes::api_routes())
        // Access log
        .layer(from_fn(middleware::access_log_middleware))
        // CORS
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
