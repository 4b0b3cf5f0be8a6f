//! The web surface of the demo application.
//!
//! Three routes: the upload page, the multipart classification endpoint, and
//! a liveness probe. Uploads are capped before they reach the handler.

pub mod error;
pub mod handlers;
pub mod state;

pub use error::ApiError;
pub use state::AppState;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

/// Maximum accepted upload size in bytes.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Creates the application router with the given state.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health))
        .route("/classify", post(handlers::classify))
        .with_state(state)
        // Axum's built-in limit defaults to 2 MB; raise it to the same cap
        // the tower-http layer enforces.
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(RequestBodyLimitLayer::new(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
}
