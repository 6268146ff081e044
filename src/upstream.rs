//! Upstream AI provider.
//!
//! [`Upstream`] is the seam the gateway dispatches through; [`OpenAiClient`]
//! talks to an OpenAI-compatible REST API with reqwest. Calls are made once:
//! no retry and no timeout beyond reqwest's defaults.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

use crate::models::{
    ChatCompletionRequest, ChatCompletionResponse, ImageGenerationRequest,
    ImageGenerationResponse,
};

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    // "<status> <message>", the way the provider reports it
    #[error("{status} {message}")]
    Api { status: u16, message: String },
}

#[async_trait]
pub trait Upstream: Send + Sync {
    async fn chat_completion(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, UpstreamError>;

    async fn generate_image(
        &self,
        request: &ImageGenerationRequest,
    ) -> Result<ImageGenerationResponse, UpstreamError>;
}

pub struct OpenAiClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl OpenAiClient {
    pub fn new(client: reqwest::Client, base_url: &str, api_key: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, UpstreamError>
    where
        B: serde::Serialize + Sync + ?Sized,
        T: DeserializeOwned + Send,
    {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, "Calling upstream");

        let res = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            let text = res.text().await.unwrap_or_default();
            return Err(api_error(status, &text));
        }

        Ok(res.json::<T>().await?)
    }
}

#[async_trait]
impl Upstream for OpenAiClient {
    async fn chat_completion(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, UpstreamError> {
        self.post_json("/chat/completions", request).await
    }

    async fn generate_image(
        &self,
        request: &ImageGenerationRequest,
    ) -> Result<ImageGenerationResponse, UpstreamError> {
        self.post_json("/images/generations", request).await
    }
}

#[derive(Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: Option<String>,
}

// Pull `error.message` out of an error body, else use the status text
fn api_error(status: StatusCode, body: &str) -> UpstreamError {
    let message = serde_json::from_str::<ApiErrorBody>(body)
        .ok()
        .and_then(|b| b.error.message)
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("status code (no body)")
                .to_string()
        });

    UpstreamError::Api {
        status: status.as_u16(),
        message,
    }
}
