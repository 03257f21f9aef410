//! HTTP surface of the campus assistant.
//!
//! Endpoints:
//! - `GET /health`
//! - `POST /chat`
//! - `POST /stt`
//! - `POST /calendar/create`
//! - `GET /calendar/{filename}`

pub mod routes;
pub mod state;
pub mod telemetry;

use axum::Router;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use state::AppState;

/// Build the application router with CORS open to any origin.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(routes::health::router())
        .merge(routes::chat::router())
        .merge(routes::stt::router())
        .merge(routes::calendar::router())
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
}
