use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::GatewayError;

// Validated gateway request
#[derive(Debug, Clone, PartialEq)]
pub enum ChatRequest {
    // messages are forwarded untouched, in order
    Text { messages: Vec<Value> },
    Image { prompt: String },
}

impl ChatRequest {
    /// Parses and validates a raw request body.
    ///
    /// Unparsable JSON is a `MalformedBody`; everything else maps to the
    /// matching 400 variant. `requestType` is checked before any other field.
    pub fn from_body(body: &[u8]) -> Result<Self, GatewayError> {
        let value: Value = serde_json::from_slice(body)?;
        Self::from_value(value)
    }

    pub fn from_value(mut value: Value) -> Result<Self, GatewayError> {
        let request_type = value
            .get("requestType")
            .and_then(Value::as_str)
            .map(str::to_owned);

        match request_type.as_deref() {
            Some("text") => {
                let messages = match value.get_mut("messages").map(Value::take) {
                    Some(Value::Array(messages)) if !messages.is_empty() => messages,
                    _ => {
                        return Err(GatewayError::InvalidMessages(
                            "Valid messages array is required",
                        ));
                    }
                };
                if !messages.iter().all(is_valid_message) {
                    return Err(GatewayError::InvalidMessages(
                        "All messages must have valid role and content",
                    ));
                }
                Ok(ChatRequest::Text { messages })
            }
            Some("image") => match value.get("prompt").and_then(Value::as_str) {
                Some(prompt) if !prompt.trim().is_empty() => Ok(ChatRequest::Image {
                    prompt: prompt.to_string(),
                }),
                _ => Err(GatewayError::InvalidPrompt),
            },
            _ => Err(GatewayError::InvalidRequestType),
        }
    }
}

// object with a role key and non blank string content
fn is_valid_message(msg: &Value) -> bool {
    let Some(obj) = msg.as_object() else {
        return false;
    };
    obj.contains_key("role")
        && obj
            .get("content")
            .and_then(Value::as_str)
            .is_some_and(|c| !c.trim().is_empty())
}

// Image mode success body
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ImageUrlResponse {
    pub image_url: String,
}

// OpenAI chat completion request format
#[derive(Debug, Serialize, Clone)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<Value>,
    pub temperature: f64,
    pub max_tokens: u32,
}

// OpenAI chat completion response format (only what we read)
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChatChoice {
    // kept as raw json so it is echoed verbatim
    #[serde(default)]
    pub message: Option<Value>,
}

// OpenAI image generation request format
#[derive(Debug, Serialize, Clone)]
pub struct ImageGenerationRequest {
    pub prompt: String,
    pub n: u32,
    pub size: String,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ImageGenerationResponse {
    #[serde(default)]
    pub data: Vec<ImageData>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ImageData {
    #[serde(default)]
    pub url: Option<String>,
}
