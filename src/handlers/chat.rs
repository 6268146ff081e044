use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::extract::rejection::BytesRejection;
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

use crate::error::GatewayError;
use crate::metrics::{RATE_LIMIT_CLIENTS, RATE_LIMITED_TOTAL, REQUEST_LATENCY, REQUEST_TOTAL, UPSTREAM_ERRORS};
use crate::models::{ChatCompletionRequest, ChatRequest, ImageGenerationRequest, ImageUrlResponse};
use crate::state::AppState;

pub const FORWARDED_FOR: &str = "x-forwarded-for";
pub const UNKNOWN_CLIENT: &str = "unknown";
pub const TEMPERATURE: f64 = 0.7;
pub const MAX_TOKENS: u32 = 1000;
pub const IMAGE_COUNT: u32 = 1;
pub const IMAGE_SIZE: &str = "512x512";

// Raw forwarded-for header, no parsing. Non UTF-8 bytes are replaced, not dropped
pub fn client_key(headers: &HeaderMap) -> String {
    headers
        .get(FORWARDED_FOR)
        .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
}

pub async fn chat_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    REQUEST_TOTAL.inc();
    let start_time = Instant::now();
    let key = client_key(&headers);

    let response = match handle(&state, &key, body).await {
        Ok(value) => Json(value).into_response(),
        Err(err) => {
            match &err {
                GatewayError::RateLimitExceeded { .. } => RATE_LIMITED_TOTAL.inc(),
                GatewayError::UpstreamFailure(_) | GatewayError::UpstreamEmptyResponse(_) => {
                    UPSTREAM_ERRORS.inc()
                }
                _ => {}
            }
            err.into_response()
        }
    };

    REQUEST_LATENCY.observe(start_time.elapsed().as_secs_f64());
    response
}

/// Rate limit, validate and dispatch one request for `key`.
///
/// A body axum could not buffer (over the size limit, broken stream) is
/// reported only after the request has been counted against the limit.
pub async fn handle(
    state: &AppState,
    key: &str,
    body: Result<Bytes, BytesRejection>,
) -> Result<Value, GatewayError> {
    let allowed = state.rate_limiter.check(key);
    RATE_LIMIT_CLIENTS.set(state.rate_limiter.len() as f64);
    if !allowed {
        return Err(GatewayError::RateLimitExceeded {
            limit: state.rate_limiter.limit(),
            window_secs: state.rate_limiter.window().as_secs(),
        });
    }

    let body = body.map_err(|rejection| GatewayError::UnreadableBody(rejection.body_text()))?;

    match ChatRequest::from_body(&body)? {
        ChatRequest::Text { messages } => {
            debug!(client = key, messages = messages.len(), "Text request");
            let request = ChatCompletionRequest {
                model: state.text_model.clone(),
                messages,
                temperature: TEMPERATURE,
                max_tokens: MAX_TOKENS,
            };
            let completion = state.upstream.chat_completion(&request).await?;

            let message = completion
                .choices
                .into_iter()
                .next()
                .and_then(|c| c.message)
                .filter(|m| !m.is_null())
                .ok_or(GatewayError::UpstreamEmptyResponse("No response from OpenAI"))?;

            info!(client = key, "Text completion served");
            Ok(message)
        }
        ChatRequest::Image { prompt } => {
            debug!(client = key, "Image request");
            let request = ImageGenerationRequest {
                prompt,
                n: IMAGE_COUNT,
                size: IMAGE_SIZE.to_string(),
            };
            let generated = state.upstream.generate_image(&request).await?;

            let image_url = generated
                .data
                .into_iter()
                .next()
                .and_then(|d| d.url)
                .ok_or(GatewayError::UpstreamEmptyResponse("No image generated by OpenAI."))?;

            info!(client = key, "Image generated");
            serde_json::to_value(ImageUrlResponse { image_url })
                .map_err(|e| GatewayError::Internal(e.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn client_key_is_the_raw_header() {
        let mut headers = HeaderMap::new();
        headers.insert(FORWARDED_FOR, HeaderValue::from_static("203.0.113.7, 10.0.0.1"));
        assert_eq!(client_key(&headers), "203.0.113.7, 10.0.0.1");
    }

    #[test]
    fn non_utf8_header_keeps_its_own_key() {
        let mut headers = HeaderMap::new();
        headers.insert(FORWARDED_FOR, HeaderValue::from_bytes(b"\xff10.0.0.9").unwrap());
        assert_eq!(client_key(&headers), "\u{FFFD}10.0.0.9");
        assert_ne!(client_key(&headers), UNKNOWN_CLIENT);
    }

    #[test]
    fn missing_header_is_unknown() {
        assert_eq!(client_key(&HeaderMap::new()), UNKNOWN_CLIENT);
    }
}
