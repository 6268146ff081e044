mod chat;
mod health;
mod metrics;

use axum::Router;
use axum::routing::{get, post};
use std::sync::Arc;

use crate::state::AppState;

pub use chat::{chat_handler, client_key, handle};
pub use health::health_handler;
pub use metrics::metrics_handler;

/// All gateway routes on one router.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/chat", post(chat_handler))
        .route("/metrics", get(metrics_handler))
        .with_state(state)
}
