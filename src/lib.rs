//! lume-gateway: rate limited chat and image gateway in front of the OpenAI API.
//!
//! A single `POST /api/chat` endpoint takes `{"requestType": "text", "messages": [...]}`
//! or `{"requestType": "image", "prompt": "..."}`, applies a per-client fixed-window
//! rate limit keyed on `x-forwarded-for`, and proxies to the upstream provider.

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod models;
pub mod rate_limit;
pub mod state;
pub mod upstream;
