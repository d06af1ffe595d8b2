use axum::{Router, http::Uri, routing::get};

use crate::{
    error::AppError,
    state::{AppState, DirectoryState},
};

pub mod doc;
pub mod health;
pub mod orders;
pub mod params;
pub mod users;

/// Full order service application without middleware or state bound.
pub fn create_order_app() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .nest("/api", orders::router())
        .merge(doc::order_docs())
        .fallback(not_found)
}

/// Full user directory application without middleware or state bound.
pub fn create_directory_app() -> Router<DirectoryState> {
    Router::new()
        .route("/health", get(health::health_check))
        .nest("/api", users::router())
        .merge(doc::directory_docs())
        .fallback(not_found)
}

/// Unknown paths answer with the same error envelope as a missing record.
pub async fn not_found(uri: Uri) -> AppError {
    tracing::debug!(path = %uri.path(), "no route matched");
    AppError::NotFound("Route")
}
