use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

use crate::upstream::UpstreamError;

pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// Every way a gateway request can fail.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error(
        "Rate limit exceeded. You can only make {limit} requests per {}.",
        window_phrase(.window_secs)
    )]
    RateLimitExceeded { limit: u32, window_secs: u64 },

    #[error("Invalid requestType. Use \"text\" or \"image\".")]
    InvalidRequestType,

    #[error("{0}")]
    InvalidMessages(&'static str),

    #[error("A valid prompt is required for image generation.")]
    InvalidPrompt,

    #[error("{0}")]
    UpstreamEmptyResponse(&'static str),

    #[error(transparent)]
    UpstreamFailure(#[from] UpstreamError),

    #[error("{0}")]
    MalformedBody(#[from] serde_json::Error),

    #[error("{0}")]
    UnreadableBody(String),

    #[error("{0}")]
    Internal(String),
}

// "minute" for the default window, otherwise the window in seconds
fn window_phrase(window_secs: &u64) -> String {
    match *window_secs {
        60 => "minute".to_string(),
        1 => "second".to_string(),
        secs => format!("{secs} seconds"),
    }
}

/// JSON error body: `{"error": "..."}`.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl GatewayError {
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::RateLimitExceeded { .. } => StatusCode::TOO_MANY_REQUESTS,
            GatewayError::InvalidRequestType
            | GatewayError::InvalidMessages(_)
            | GatewayError::InvalidPrompt => StatusCode::BAD_REQUEST,
            GatewayError::UpstreamEmptyResponse(_)
            | GatewayError::UpstreamFailure(_)
            | GatewayError::MalformedBody(_)
            | GatewayError::UnreadableBody(_)
            | GatewayError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message sent to the client. Falls back to a fixed string when the
    /// underlying failure carries none.
    pub fn client_message(&self) -> String {
        let message = self.to_string();
        if message.trim().is_empty() {
            INTERNAL_ERROR_MESSAGE.to_string()
        } else {
            message
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.client_message();

        if status.is_server_error() {
            error!(status = status.as_u16(), error = %message, "API error");
        } else {
            warn!(status = status.as_u16(), error = %message, "Request rejected");
        }

        (status, Json(ErrorBody { error: message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_the_taxonomy() {
        assert_eq!(
            GatewayError::RateLimitExceeded { limit: 2, window_secs: 60 }.status(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(GatewayError::InvalidRequestType.status(), StatusCode::BAD_REQUEST);
        assert_eq!(GatewayError::InvalidPrompt.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            GatewayError::UpstreamEmptyResponse("No response from OpenAI").status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn rate_limit_message_reports_the_limit() {
        assert_eq!(
            GatewayError::RateLimitExceeded { limit: 2, window_secs: 60 }.client_message(),
            "Rate limit exceeded. You can only make 2 requests per minute."
        );
    }

    #[test]
    fn rate_limit_message_follows_a_custom_window() {
        assert_eq!(
            GatewayError::RateLimitExceeded { limit: 5, window_secs: 30 }.client_message(),
            "Rate limit exceeded. You can only make 5 requests per 30 seconds."
        );
        assert_eq!(
            GatewayError::RateLimitExceeded { limit: 1, window_secs: 1 }.client_message(),
            "Rate limit exceeded. You can only make 1 requests per second."
        );
    }

    #[test]
    fn empty_message_falls_back_to_generic_text() {
        assert_eq!(
            GatewayError::Internal(String::new()).client_message(),
            INTERNAL_ERROR_MESSAGE
        );
    }
}
