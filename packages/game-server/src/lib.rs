use axum::{http::HeaderValue, routing::get, Router};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::warn;

pub mod actions;
pub mod auth;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;
pub mod timeouts;

use state::AppState;

/// Builds the router. Without a client origin CORS is open to any origin.
pub fn build_app(state: AppState, client_origin: Option<&str>) -> Router {
    let origin = match client_origin.map(HeaderValue::from_str) {
        Some(Ok(value)) => AllowOrigin::exact(value),
        Some(Err(e)) => {
            warn!("Ignoring invalid CLIENT_ORIGIN: {}", e);
            AllowOrigin::from(Any)
        }
        None => AllowOrigin::from(Any),
    };
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(routes::health::health_check))
        .merge(routes::auth::routes())
        .merge(routes::user::routes())
        .merge(routes::matches::routes())
        .merge(routes::websocket::routes())
        .layer(cors)
        .with_state(state)
}
