use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{health_check, process_query_request};
use crate::state::AppState;

pub fn create_routes() -> Router<AppState> {
    Router::new()
        // Function entry point
        .route("/", post(process_query_request))
        .route("/query", post(process_query_request))

        // Health check
        .route("/health", get(health_check))
}

/// Full application: routes, middleware and state.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(create_routes())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
