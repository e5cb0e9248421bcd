//! API routes module

pub mod push;

use std::sync::Arc;

use crate::api::state::AppState;
use axum::{Router, routing::get};

type SharedState = Arc<AppState>;

// Liveness check
async fn index() -> &'static str {
    "Push relay is running"
}

/// Create the combined API router
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/", get(index))
        // Push notification routes
        .merge(push::router())
}
