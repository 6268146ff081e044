use std::sync::Arc;
use crate::rate_limit::RateLimiter;
use crate::upstream::Upstream;

// app's shared state
pub struct AppState {
    pub upstream: Arc<dyn Upstream>,
    pub rate_limiter: Arc<RateLimiter>, // shared with the sweeper task
    pub text_model: String,             // model for text requests
}

impl AppState {
    pub fn new(upstream: Arc<dyn Upstream>, rate_limiter: Arc<RateLimiter>, text_model: &str) -> Self {
        Self {
            upstream,
            rate_limiter,
            text_model: text_model.to_string(),
        }
    }
}
