//! Axum router configuration with middleware.
//!
//! All routes are under `/api/v1/`. Middleware: CORS and request tracing.

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

/// Build the complete API router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        // Conversational flow
        .route("/chat/start", post(handlers::chat::start_chat))
        .route("/chat/message", post(handlers::chat::post_message))
        // Applications (admin/reporting)
        .route(
            "/applications/{id}",
            get(handlers::application::get_application),
        )
        .route("/applications", get(handlers::application::list_applications))
        // Catalog
        .route("/loan-types", get(handlers::application::loan_types))
        .with_state(state);

    Router::new()
        .route("/health", get(handlers::health))
        .nest("/api/v1", api_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
